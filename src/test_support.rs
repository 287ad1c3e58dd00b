//! Synthetic overlay fixtures shared by the unit tests.

use image::{Rgba, RgbaImage};

use crate::core::config::OverlayLayout;
use crate::core::video::{CharLine, VideoFrame};

pub(crate) const TEST_KEYS: &str = "0123456789_";

/// 8x10 glyphs, 12 characters per half line, band at rows 6..16.
pub(crate) fn small_layout() -> OverlayLayout {
    OverlayLayout {
        glyph_width: 8,
        glyph_height: 10,
        expected_frame_width: 200,
        top_data_row: 6,
        mid_grey: 128,
        glyph_threshold: 16.0,
        keys: TEST_KEYS.to_string(),
        divisor_override: None,
    }
}

/// Same glyphs, 40 characters per half line: room for a full overlay.
pub(crate) fn wide_layout() -> OverlayLayout {
    OverlayLayout {
        expected_frame_width: 640,
        ..small_layout()
    }
}

pub(crate) const FRAME_HEIGHT: u32 = 20;

/// Deterministic pseudo-random weights for the glyph at `index`.
pub(crate) fn glyph_pattern(index: usize, layout: &OverlayLayout) -> Vec<i8> {
    let cells = (layout.glyph_width * layout.glyph_height) as usize;
    let mut state = (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    (0..cells)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            match (state >> 32) % 5 {
                0 => 0,
                1 | 2 => 1,
                _ => -1,
            }
        })
        .collect()
}

pub(crate) fn weight_pixel(weight: i8) -> Rgba<u8> {
    match weight {
        1 => Rgba([255, 255, 255, 255]),
        -1 => Rgba([0, 0, 0, 255]),
        _ => Rgba([0, 0, 0, 0]),
    }
}

/// Reference image holding every test glyph in key order.
pub(crate) fn render_reference(layout: &OverlayLayout) -> RgbaImage {
    let gw = layout.glyph_width;
    let count = layout.keys.chars().count() as u32;
    let mut image = RgbaImage::new(gw * count, layout.glyph_height);
    for index in 0..count as usize {
        let pattern = glyph_pattern(index, layout);
        for (cell, &weight) in pattern.iter().enumerate() {
            let x = index as u32 * gw + cell as u32 % gw;
            let y = cell as u32 / gw;
            image.put_pixel(x, y, weight_pixel(weight));
        }
    }
    image
}

/// Frame whose overlay band shows `left` and `right` drawn with the test
/// glyphs. Characters outside the key set stay mid grey.
pub(crate) fn render_frame(layout: &OverlayLayout, left: &str, right: &str, pts: i64) -> VideoFrame {
    let width = layout.expected_frame_width as usize;
    let mut luma = vec![layout.mid_grey; width * FRAME_HEIGHT as usize];
    draw_text(layout, &mut luma, width, 0, left);
    draw_text(layout, &mut luma, width, layout.right_start(), right);
    VideoFrame::new(layout.expected_frame_width, FRAME_HEIGHT, luma, pts)
}

fn draw_text(layout: &OverlayLayout, luma: &mut [u8], stride: usize, x0: usize, text: &str) {
    let gw = layout.glyph_width as usize;
    let top = layout.top_data_row as usize;
    for (position, c) in text.chars().enumerate() {
        let Some(index) = layout.keys.chars().position(|k| k == c) else {
            continue;
        };
        for (cell, &weight) in glyph_pattern(index, layout).iter().enumerate() {
            let x = x0 + position * gw + cell % gw;
            let y = top + cell / gw;
            luma[y * stride + x] = match weight {
                1 => 255,
                -1 => 0,
                _ => layout.mid_grey,
            };
        }
    }
}

/// Right half line for the small layout ending in `seconds` and a space.
pub(crate) fn clock_text(minutes: u32, seconds: u32) -> String {
    format!("   1_ {:02} {:02} ", minutes, seconds)
}

/// Pads `text` with spaces to the small layout's 12 characters.
pub(crate) fn pad12(text: &str) -> String {
    format!("{:<12}", text)
}

pub(crate) fn padded_line(left: &str, right: &str) -> CharLine {
    CharLine::new(pad12(left), pad12(right))
}
