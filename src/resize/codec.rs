//! Image codec.
//!
//! This module turns fetched original bytes into an RGBA raster and encodes
//! resized rasters back into the format named by the request extension.
//!
//! # Design Decisions
//!
//! - **Format sniffing on decode**: Originals are decoded from their magic
//!   bytes, not from the object key, so a `.png` original can back a `.jpg`
//!   variant.
//!
//! - **RGBA working space**: The resize engine always sees RGBA. JPEG output
//!   drops the alpha channel; PNG output keeps it.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageReader, RgbaImage};

use crate::error::CodecError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// Output Format
// =============================================================================

/// Encodings a variant can be served in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Map a request extension (`jpg`, `jpeg`, `png`, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }

    /// MIME type for the `Content-Type` header.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

// =============================================================================
// Codec Trait
// =============================================================================

/// Byte stream <-> raster conversion used by the resize pipeline.
///
/// Implementations must be thread-safe; the pipeline calls them from
/// blocking worker threads.
pub trait Codec: Send + Sync {
    /// Decode an original into an RGBA raster.
    fn decode(&self, data: &[u8]) -> Result<RgbaImage, CodecError>;

    /// Encode a raster in `format`. `quality` only applies to lossy formats.
    fn encode(
        &self,
        image: &RgbaImage,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Bytes, CodecError>;
}

// =============================================================================
// image-crate Codec
// =============================================================================

/// [`Codec`] backed by the `image` crate (JPEG and PNG).
#[derive(Debug, Clone, Default)]
pub struct ImageCodec {}

impl ImageCodec {
    pub fn new() -> Self {
        Self {}
    }

    /// Get image dimensions without fully decoding.
    pub fn dimensions(&self, data: &[u8]) -> Result<(u32, u32), CodecError> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| CodecError::Decode(e.to_string()))
    }
}

impl Codec for ImageCodec {
    fn decode(&self, data: &[u8]) -> Result<RgbaImage, CodecError> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        Ok(img.into_rgba8())
    }

    fn encode(
        &self,
        image: &RgbaImage,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Bytes, CodecError> {
        let mut output = Vec::new();

        let result = match format {
            OutputFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut output, clamp_quality(quality));
                rgb.write_with_encoder(encoder)
            }
            OutputFormat::Png => image.write_with_encoder(PngEncoder::new(&mut output)),
        };
        result.map_err(|e| CodecError::Encode(e.to_string()))?;

        Ok(Bytes::from(output))
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}
