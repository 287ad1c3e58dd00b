//! Glyph templates built from the reference image
//!
//! The reference image holds one glyph cell per key, left to right in key
//! order. Every pixel becomes a trinary weight: opaque white rewards bright
//! frame pixels, opaque black rewards dark ones, transparent pixels are
//! ignored.

use std::collections::HashSet;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use log::{debug, info};

use super::GlyphError;
use crate::core::config::OverlayLayout;

/// Weight of one reference pixel.
///
/// Alpha 0 is background. Any other pixel is foreground and its colour bit
/// (least significant bit of blue) tells white (+1) from black (-1).
pub fn classify_pixel(pixel: Rgba<u8>) -> i8 {
    let [_, _, blue, alpha] = pixel.0;
    if alpha == 0 {
        0
    } else if blue & 1 == 1 {
        1
    } else {
        -1
    }
}

/// A character's correlation template.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    key: char,
    width: usize,
    height: usize,
    /// Row-major, `height * width` weights in {-1, 0, 1}
    weights: Vec<i8>,
    /// Normalizes scores of glyphs with different stroke coverage
    divisor: u32,
}

impl Glyph {
    pub fn key(&self) -> char {
        self.key
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    pub fn weights(&self) -> &[i8] {
        &self.weights
    }

    pub fn weight(&self, row: usize, col: usize) -> i8 {
        self.weights[row * self.width + col]
    }

    pub fn row(&self, row: usize) -> &[i8] {
        let start = row * self.width;
        &self.weights[start..start + self.width]
    }

    /// Count of non-zero weights.
    pub fn area(&self) -> u32 {
        self.weights.iter().filter(|&&w| w != 0).count() as u32
    }
}

/// One glyph per key, in key order. Read-only once built.
#[derive(Debug, Clone)]
pub struct GlyphCatalog {
    layout: OverlayLayout,
    glyphs: Vec<Glyph>,
}

impl GlyphCatalog {
    /// Load the reference image from disk.
    pub fn from_path(path: &Path, layout: &OverlayLayout) -> Result<Self, GlyphError> {
        info!("🔤 Loading glyph reference from {:?}", path);
        let image = image::open(path)?.to_rgba8();
        Self::from_image(&image, layout)
    }

    /// Decode an in-memory PNG reference image.
    pub fn from_png_bytes(bytes: &[u8], layout: &OverlayLayout) -> Result<Self, GlyphError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
        Self::from_image(&image, layout)
    }

    pub fn from_image(image: &RgbaImage, layout: &OverlayLayout) -> Result<Self, GlyphError> {
        layout.validate()?;
        let keys = checked_keys(layout)?;

        let glyph_width = layout.glyph_width as usize;
        let glyph_height = layout.glyph_height as usize;
        let expected_width = layout.glyph_width * keys.len() as u32;
        if image.width() < expected_width || image.height() < layout.glyph_height {
            return Err(GlyphError::ReferenceTooSmall {
                width: image.width(),
                height: image.height(),
                expected_width,
                expected_height: layout.glyph_height,
            });
        }

        let mut glyphs = Vec::with_capacity(keys.len());
        for (index, &key) in keys.iter().enumerate() {
            let x0 = index * glyph_width;
            let mut weights = Vec::with_capacity(glyph_width * glyph_height);
            for row in 0..glyph_height {
                for col in 0..glyph_width {
                    let pixel = *image.get_pixel((x0 + col) as u32, row as u32);
                    weights.push(classify_pixel(pixel));
                }
            }

            let mut glyph = Glyph {
                key,
                width: glyph_width,
                height: glyph_height,
                weights,
                divisor: 0,
            };
            glyph.divisor = glyph.area();
            debug!("Glyph {:?}: area {}", key, glyph.divisor);
            glyphs.push(glyph);
        }

        if let Some(ov) = &layout.divisor_override {
            let glyph = glyphs
                .iter_mut()
                .find(|g| g.key == ov.key)
                .ok_or(GlyphError::UnknownOverrideKey(ov.key))?;
            debug!(
                "Glyph {:?}: divisor {} overridden to {}",
                ov.key, glyph.divisor, ov.divisor
            );
            glyph.divisor = ov.divisor;
        }

        info!("✅ Glyph catalog ready: {} glyphs", glyphs.len());
        Ok(Self {
            layout: layout.clone(),
            glyphs,
        })
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn get(&self, key: char) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.key == key)
    }

    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

fn checked_keys(layout: &OverlayLayout) -> Result<Vec<char>, GlyphError> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    for key in layout.keys.chars() {
        if !key.is_ascii() {
            return Err(GlyphError::NonAsciiKey(key));
        }
        if !seen.insert(key) {
            return Err(GlyphError::DuplicateKey(key));
        }
        keys.push(key);
    }
    Ok(keys)
}
