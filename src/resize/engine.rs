//! Nearest-neighbor resize engine.
//!
//! Every destination pixel copies exactly one source pixel, so the output is
//! bit-reproducible for identical inputs. That property is what lets the disk
//! cache treat a derived image as a pure function of its request descriptor.

use image::RgbaImage;

use crate::error::ResizeError;

use super::size::Dimension;

/// Largest output the engine will allocate: 16384 x 16384 pixels (1 GiB RGBA).
pub const MAX_TARGET_PIXELS: u64 = 1 << 28;

/// Resize `src` to `target` with nearest-neighbor sampling.
///
/// - `0x0` returns a copy of the source.
/// - A zero width is inferred as `src_w * height / src_h` (floor).
/// - A zero height is inferred as `src_h * width / src_w` (floor).
///
/// Destination pixel `(x, y)` samples source pixel
/// `(x * src_w / width, y * src_h / height)`, clamped to the last column/row.
/// RGBA values, alpha included, are copied without blending.
///
/// # Errors
///
/// - [`ResizeError::EmptySource`] if the source has a zero width or height.
///   Decoders never produce such images, but the aspect-ratio inference would
///   otherwise divide by zero.
/// - [`ResizeError::EmptyTarget`] if inference collapses one side to zero
///   (e.g. a 1x100 source asked for `0x1`).
/// - [`ResizeError::TargetTooLarge`] if an inferred side does not fit in
///   `u32` or the output exceeds [`MAX_TARGET_PIXELS`]. Checked before any
///   allocation.
pub fn resize_nearest(src: &RgbaImage, target: Dimension) -> Result<RgbaImage, ResizeError> {
    let (src_w, src_h) = src.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(ResizeError::EmptySource {
            width: src_w,
            height: src_h,
        });
    }

    if target.is_original() {
        return Ok(src.clone());
    }

    let (width, height) = infer_dimensions(src_w, src_h, target)?;
    if width == 0 || height == 0 {
        return Err(ResizeError::EmptyTarget { width, height });
    }
    if u64::from(width) * u64::from(height) > MAX_TARGET_PIXELS {
        return Err(ResizeError::TargetTooLarge {
            width: u64::from(width),
            height: u64::from(height),
        });
    }

    // Column lookup is shared by every row.
    let columns: Vec<u32> = (0..width)
        .map(|x| sample_index(x, src_w, width))
        .collect();

    let mut dst = RgbaImage::new(width, height);
    for y in 0..height {
        let src_y = sample_index(y, src_h, height);
        for (x, &src_x) in columns.iter().enumerate() {
            dst.put_pixel(x as u32, y, *src.get_pixel(src_x, src_y));
        }
    }

    Ok(dst)
}

/// Fill in a zero side from the source aspect ratio.
///
/// Callers guarantee `src_w` and `src_h` are non-zero.
fn infer_dimensions(
    src_w: u32,
    src_h: u32,
    target: Dimension,
) -> Result<(u32, u32), ResizeError> {
    let Dimension { width, height } = target;
    if width == 0 {
        let inferred = u64::from(src_w) * u64::from(height) / u64::from(src_h);
        let width = u32::try_from(inferred).map_err(|_| ResizeError::TargetTooLarge {
            width: inferred,
            height: u64::from(height),
        })?;
        Ok((width, height))
    } else if height == 0 {
        let inferred = u64::from(src_h) * u64::from(width) / u64::from(src_w);
        let height = u32::try_from(inferred).map_err(|_| ResizeError::TargetTooLarge {
            width: u64::from(width),
            height: inferred,
        })?;
        Ok((width, height))
    } else {
        Ok((width, height))
    }
}

#[inline]
fn sample_index(dst: u32, src_len: u32, dst_len: u32) -> u32 {
    let idx = u64::from(dst) * u64::from(src_len) / u64::from(dst_len);
    (idx as u32).min(src_len - 1)
}
