use thiserror::Error;

pub mod geodesy;
pub mod parser;
pub mod sink;
pub mod validator;

pub use geodesy::great_circle_distance;
pub use parser::{
    extract_point, line_time, nominal_start, read_position, record_name, PositionReading,
    SimplePoint,
};
pub use sink::{MemorySink, TelemetrySink};
pub use validator::{Rejection, TelemetryRecord, TelemetrySample, TelemetryValidator, Verdict};

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Source name does not end in YYYYMMDDhhmmss_xxxxxx.TS: {0}")]
    InvalidSourceName(String),
    #[error("Storage failed: {0}")]
    Storage(String),
}
