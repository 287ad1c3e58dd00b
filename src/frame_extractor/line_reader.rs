use std::cell::RefCell;
use std::ops::Range;

use crate::core::glyph::GlyphCatalog;
use crate::core::video::{CharLine, VideoError, VideoFrame};

/// Reads one `CharLine` out of a decoded frame.
pub trait LineReader {
    fn read_line(&self, frame: &VideoFrame) -> Result<CharLine, VideoError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Left,
    Right,
}

/// 字形模板相关匹配
///
/// Every character cell of the overlay band is correlated against every
/// glyph: `Σ (pixel - mid_grey) * weight`, divided by the glyph divisor.
/// The strictly best positive score wins; below the threshold the cell is a
/// space. Cells are independent, no context between neighbours.
pub struct LineExtractor<'a> {
    catalog: &'a GlyphCatalog,
}

impl<'a> LineExtractor<'a> {
    pub fn new(catalog: &'a GlyphCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &GlyphCatalog {
        self.catalog
    }

    /// Normalized scores of every glyph for one cell, in catalog order.
    pub fn cell_scores(
        &self,
        frame: &VideoFrame,
        half: Half,
        cell: usize,
    ) -> Result<Vec<f64>, VideoError> {
        self.check_geometry(frame)?;
        let cells = self.catalog.layout().frame_string_length();
        if cell >= cells {
            return Err(VideoError::CellOutOfRange { cell, cells });
        }

        let sums = self.cell_sums(frame, self.half_start(half), cell..cell + 1);
        Ok(self.normalize(&sums))
    }

    fn half_start(&self, half: Half) -> usize {
        match half {
            Half::Left => 0,
            Half::Right => self.catalog.layout().right_start(),
        }
    }

    fn check_geometry(&self, frame: &VideoFrame) -> Result<(), VideoError> {
        let layout = self.catalog.layout();
        let reason = if !frame.is_consistent() {
            Some(format!("buffer holds {} bytes", frame.y_plane.len()))
        } else if frame.width < layout.expected_frame_width {
            Some(format!("expected width {}", layout.expected_frame_width))
        } else if (frame.height as usize) < layout.band_end() {
            Some(format!("band ends at row {}", layout.band_end()))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(VideoError::FrameGeometry {
                width: frame.width,
                height: frame.height,
                stride: frame.stride,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Raw correlation sums of `cells` of the half line starting at column
    /// `x0`, `cells * glyphs` laid out cell-major.
    fn cell_sums(&self, frame: &VideoFrame, x0: usize, cells: Range<usize>) -> Vec<i32> {
        let layout = self.catalog.layout();
        let glyphs = self.catalog.glyphs();
        let glyph_width = layout.glyph_width as usize;
        let mid_grey = layout.mid_grey as i32;
        let top = layout.top_data_row as usize;
        let first = x0 + cells.start * glyph_width;
        let last = x0 + cells.end * glyph_width;

        let mut sums = vec![0i32; cells.len() * glyphs.len()];
        for (band_row, y) in (top..layout.band_end()).enumerate() {
            let pixels = &frame.row(y)[first..last];
            for (x, &pixel) in pixels.iter().enumerate() {
                let centered = pixel as i32 - mid_grey;
                if centered == 0 {
                    continue;
                }
                let cell = x / glyph_width;
                let col = x % glyph_width;
                let cell_sums = &mut sums[cell * glyphs.len()..(cell + 1) * glyphs.len()];
                for (sum, glyph) in cell_sums.iter_mut().zip(glyphs) {
                    *sum += centered * glyph.weight(band_row, col) as i32;
                }
            }
        }
        sums
    }

    fn normalize(&self, cell_sums: &[i32]) -> Vec<f64> {
        cell_sums
            .iter()
            .zip(self.catalog.glyphs())
            .map(|(&sum, glyph)| match glyph.divisor() {
                0 => 0.0,
                divisor => sum as f64 / divisor as f64,
            })
            .collect()
    }

    fn pick_key(&self, scores: &[f64]) -> char {
        let mut best = 0.0;
        let mut best_index = 0;
        for (index, &score) in scores.iter().enumerate() {
            if score > best {
                best = score;
                best_index = index;
            }
        }

        if best >= self.catalog.layout().glyph_threshold {
            self.catalog.glyphs()[best_index].key()
        } else {
            ' '
        }
    }

    fn read_half(&self, frame: &VideoFrame, half: Half) -> String {
        let cells = 0..self.catalog.layout().frame_string_length();
        let sums = self.cell_sums(frame, self.half_start(half), cells);
        sums.chunks(self.catalog.len())
            .map(|cell_sums| self.pick_key(&self.normalize(cell_sums)))
            .collect()
    }
}

impl LineReader for LineExtractor<'_> {
    fn read_line(&self, frame: &VideoFrame) -> Result<CharLine, VideoError> {
        self.check_geometry(frame)?;
        Ok(CharLine::new(
            self.read_half(frame, Half::Left),
            self.read_half(frame, Half::Right),
        ))
    }
}

/// Answers from a closure over the frame timestamp and records every frame
/// it was asked to read.
pub struct MockLineReader {
    pattern: Box<dyn Fn(i64) -> CharLine>,
    read_pts: RefCell<Vec<i64>>,
}

impl MockLineReader {
    pub fn with_pattern<F>(pattern: F) -> Self
    where
        F: Fn(i64) -> CharLine + 'static,
    {
        Self {
            pattern: Box::new(pattern),
            read_pts: RefCell::new(Vec::new()),
        }
    }

    /// Timestamps of the frames read so far, in order.
    pub fn read_pts(&self) -> Vec<i64> {
        self.read_pts.borrow().clone()
    }
}

impl LineReader for MockLineReader {
    fn read_line(&self, frame: &VideoFrame) -> Result<CharLine, VideoError> {
        self.read_pts.borrow_mut().push(frame.pts);
        Ok((self.pattern)(frame.pts))
    }
}
