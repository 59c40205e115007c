//! Minimum-dimension image filter.
//!
//! Only the header is read: the format is sniffed from the leading bytes and
//! the dimensions come from the decoder without decoding pixel data.

use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;

/// Default minimum width and height in pixels.
pub const DEFAULT_MIN_DIMENSION: u32 = 800;

/// Why a payload did not pass the filter. Both are routine outcomes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("not a decodable image: {0}")]
    Decode(String),
    #[error("too small: {width}x{height}")]
    TooSmall { width: u32, height: u32 },
}

/// What the filter learned about an accepted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageInfo {
    /// File extension for the sniffed format.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFilter {
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_DIMENSION,
            min_height: DEFAULT_MIN_DIMENSION,
        }
    }
}

impl ImageFilter {
    pub fn new(min_width: u32, min_height: u32) -> Self {
        Self {
            min_width,
            min_height,
        }
    }

    pub fn accept(&self, data: &[u8]) -> Result<ImageInfo, Rejection> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| Rejection::Decode(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| Rejection::Decode("unknown format".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| Rejection::Decode(e.to_string()))?;

        if width < self.min_width || height < self.min_height {
            return Err(Rejection::TooSmall { width, height });
        }
        Ok(ImageInfo {
            width,
            height,
            format,
        })
    }
}
