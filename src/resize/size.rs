//! Size spec parsing.
//!
//! Assortment catalogs describe each named size as `"<width>x<height>"`.
//! A zero on either side means "infer from the source aspect ratio", and
//! `0x0` means "serve at the original size".

use std::fmt;
use std::str::FromStr;

use crate::error::SizeError;

/// Separator between width and height in a size spec.
const SEPARATOR: char = 'x';

/// Target dimensions for a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when neither side is constrained, i.e. no resize is requested.
    pub fn is_original(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.width, SEPARATOR, self.height)
    }
}

impl FromStr for Dimension {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_size(s)
    }
}

/// Parse a `"<width>x<height>"` spec into a [`Dimension`].
///
/// Only plain decimal digits are accepted on each side; signs, whitespace
/// and values above `u32::MAX` are rejected.
pub fn parse_size(spec: &str) -> Result<Dimension, SizeError> {
    let mut parts = spec.split(SEPARATOR);
    let (width, height) = match (parts.next(), parts.next(), parts.next()) {
        (Some(w), Some(h), None) if !w.is_empty() && !h.is_empty() => (w, h),
        _ => return Err(SizeError::InvalidFormat(spec.to_string())),
    };

    Ok(Dimension {
        width: parse_side(width)?,
        height: parse_side(height)?,
    })
}

fn parse_side(side: &str) -> Result<u32, SizeError> {
    if !side.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SizeError::InvalidDimension(side.to_string()));
    }
    side.parse::<u32>()
        .map_err(|_| SizeError::InvalidDimension(side.to_string()))
}
