//! Raster side of the pipeline.
//!
//! - [`parse_size`] / [`Dimension`]: `"<width>x<height>"` size specs
//! - [`resize_nearest`]: deterministic nearest-neighbor scaling
//! - [`Codec`] / [`ImageCodec`]: bytes <-> RGBA raster conversion

mod codec;
mod engine;
mod size;

pub use codec::{
    clamp_quality, is_valid_quality, Codec, ImageCodec, OutputFormat, DEFAULT_JPEG_QUALITY,
    MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use engine::{resize_nearest, MAX_TARGET_PIXELS};
pub use size::{parse_size, Dimension};
