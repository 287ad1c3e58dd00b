pub mod catalog;

use thiserror::Error;

pub use catalog::{classify_pixel, Glyph, GlyphCatalog};

#[derive(Debug, Error)]
pub enum GlyphError {
    #[error("Reference image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Reference image is {width}x{height}, expected at least {expected_width}x{expected_height}")]
    ReferenceTooSmall {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error("Glyph key {0:?} appears more than once")]
    DuplicateKey(char),
    #[error("Glyph key {0:?} is not ASCII")]
    NonAsciiKey(char),
    #[error("Divisor override names unknown key {0:?}")]
    UnknownOverrideKey(char),
    #[error("Invalid layout: {0}")]
    Layout(#[from] crate::core::config::ConfigError),
}
