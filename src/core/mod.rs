pub mod config;
pub mod glyph;
pub mod telemetry;
pub mod video;
