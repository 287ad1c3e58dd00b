//! Pipeline configuration
//!
//! The overlay geometry is not self-describing in the reference image or the
//! video, so every number the recognizer relies on lives here and is checked
//! before any pixel is read.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
}

/// A single glyph whose computed area is replaced by a fixed divisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisorOverride {
    pub key: char,
    pub divisor: u32,
}

/// Where the overlay text sits and how glyph cells are laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayLayout {
    /// Glyph cell width in pixels
    pub glyph_width: u32,
    /// Glyph cell height in pixels, also the overlay band height
    pub glyph_height: u32,
    /// Frame width the overlay was rendered for
    pub expected_frame_width: u32,
    /// First frame row of the overlay band
    pub top_data_row: u32,
    /// Luma value treated as zero when correlating
    pub mid_grey: u8,
    /// Normalized score below which a cell reads as a space
    pub glyph_threshold: f64,
    /// Keys of the reference image cells, left to right
    pub keys: String,
    pub divisor_override: Option<DivisorOverride>,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            glyph_width: 18,
            glyph_height: 30,
            expected_frame_width: 2560,
            top_data_row: 1393,
            mid_grey: 128,
            glyph_threshold: 16.0,
            keys: "0123456789_".to_string(),
            // '3' is normalized by the area of '8'.
            divisor_override: Some(DivisorOverride {
                key: '3',
                divisor: 287,
            }),
        }
    }
}

impl OverlayLayout {
    /// Characters per half line: `floor(expected_frame_width / 2 / glyph_width)`.
    pub fn frame_string_length(&self) -> usize {
        if self.glyph_width == 0 {
            return 0;
        }
        (self.expected_frame_width / 2 / self.glyph_width) as usize
    }

    /// Pixel width of one half line.
    pub fn half_width(&self) -> usize {
        self.frame_string_length() * self.glyph_width as usize
    }

    /// First column of the right half line.
    pub fn right_start(&self) -> usize {
        self.expected_frame_width as usize - self.half_width()
    }

    /// Exclusive end row of the overlay band.
    pub fn band_end(&self) -> usize {
        (self.top_data_row + self.glyph_height) as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.glyph_width == 0 || self.glyph_height == 0 {
            return Err(ConfigError::InvalidLayout(format!(
                "glyph cell must not be empty ({}x{})",
                self.glyph_width, self.glyph_height
            )));
        }
        if self.frame_string_length() == 0 {
            return Err(ConfigError::InvalidLayout(format!(
                "frame width {} holds no {}px glyph per half",
                self.expected_frame_width, self.glyph_width
            )));
        }
        if self.keys.is_empty() {
            return Err(ConfigError::InvalidLayout("no glyph keys".to_string()));
        }
        if !self.glyph_threshold.is_finite() {
            return Err(ConfigError::InvalidLayout(format!(
                "glyph threshold {} is not finite",
                self.glyph_threshold
            )));
        }
        Ok(())
    }
}

/// Temporal sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Maximum number of lines one video may produce
    pub max_lines: usize,
    /// Position of the seconds unit digit counted from the end of the right
    /// half line
    pub seconds_digit_from_end: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        // Five minute clips at one line per second, plus the calibration line.
        Self {
            max_lines: 301,
            seconds_digit_from_end: 2,
        }
    }
}

/// Plausibility limits for a video's telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Largest allowed lead of a line timestamp over the nominal start
    pub max_start_drift_secs: i64,
    /// A step back in time of this many seconds or more rejects the video
    pub max_backward_secs: i64,
    /// Speed ceiling between consecutive valid points
    pub max_speed_mps: f64,
    /// Ellipsoid semi-major axis in meters
    pub ellipsoid_a: f64,
    /// Ellipsoid semi-minor axis in meters
    pub ellipsoid_b: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        // Clips are cut every 5 minutes; GRS80 axes.
        Self {
            max_start_drift_secs: 330,
            max_backward_secs: 2,
            max_speed_mps: 200.0,
            ellipsoid_a: 6_378_137.0,
            ellipsoid_b: 6_356_752.314_140_356,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub layout: OverlayLayout,
    pub sampler: SamplerConfig,
    pub validation: ValidationConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        if self.sampler.seconds_digit_from_end == 0
            || self.sampler.seconds_digit_from_end > self.layout.frame_string_length()
        {
            return Err(ConfigError::InvalidLayout(format!(
                "seconds digit offset {} outside a {} character line",
                self.sampler.seconds_digit_from_end,
                self.layout.frame_string_length()
            )));
        }
        Ok(())
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: PipelineConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to a JSON file
pub fn save_config(config: &PipelineConfig, path: &Path) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
