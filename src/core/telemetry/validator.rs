use chrono::{Local, TimeZone};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::ValidationConfig;
use crate::core::telemetry::geodesy::great_circle_distance;
use crate::core::telemetry::parser::{
    extract_point, line_time, nominal_start, read_position, PositionReading,
};
use crate::core::telemetry::{SimplePoint, TelemetryError};
use crate::core::video::CharLine;

/// One line converted for storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub timestamp: Option<i64>,
    pub point: SimplePoint,
}

/// A stored fix: a timestamp and a valid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp: i64,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("line {line}: {drift_secs}s after the nominal start")]
    StartDrift { line: usize, drift_secs: i64 },
    #[error("line {line}: clock went back {back_secs}s")]
    Backward { line: usize, back_secs: i64 },
    #[error("line {line}: moved {distance_m:.0}m in {elapsed_secs}s")]
    TooFast {
        line: usize,
        distance_m: f64,
        elapsed_secs: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// 轨迹合理性校验
///
/// A video is accepted only when its overlay clock stays close to the start
/// encoded in its name, never runs backwards, and the car never moves faster
/// than the configured ceiling between two fixes.
pub struct TelemetryValidator<Tz: TimeZone = Local> {
    config: ValidationConfig,
    tz: Tz,
}

impl TelemetryValidator<Local> {
    pub fn new(config: ValidationConfig) -> Self {
        Self::with_time_zone(config, Local)
    }
}

impl Default for TelemetryValidator<Local> {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl<Tz: TimeZone> TelemetryValidator<Tz> {
    pub fn with_time_zone(config: ValidationConfig, tz: Tz) -> Self {
        Self { config, tz }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Recording start encoded in `identifier`, in this validator's zone.
    pub fn nominal_start(&self, identifier: &str) -> Result<i64, TelemetryError> {
        nominal_start(identifier, &self.tz)
    }

    pub fn check_lines(&self, identifier: &str, lines: &[CharLine]) -> Result<Verdict, TelemetryError> {
        let start = self.nominal_start(identifier)?;
        let mut previous_time = start;
        let mut previous_point = SimplePoint::invalid();

        for (index, line) in lines.iter().enumerate() {
            let Some(time) = line_time(line, &self.tz) else {
                debug!("Line {} has no readable time: {}", index, line);
                continue;
            };

            let drift = time - start;
            if drift > self.config.max_start_drift_secs {
                return Ok(Verdict::Rejected(Rejection::StartDrift {
                    line: index,
                    drift_secs: drift,
                }));
            }

            let elapsed = time - previous_time;
            if elapsed <= -self.config.max_backward_secs {
                return Ok(Verdict::Rejected(Rejection::Backward {
                    line: index,
                    back_secs: -elapsed,
                }));
            }

            let point = self.read_point(index, line);
            if !point.valid {
                continue;
            }

            if previous_point.valid && elapsed >= 1 {
                let distance = great_circle_distance(
                    &previous_point,
                    &point,
                    self.config.ellipsoid_a,
                    self.config.ellipsoid_b,
                );
                if distance > self.config.max_speed_mps * elapsed as f64 {
                    return Ok(Verdict::Rejected(Rejection::TooFast {
                        line: index,
                        distance_m: distance,
                        elapsed_secs: elapsed,
                    }));
                }
            }

            previous_time = time;
            previous_point = point;
        }

        Ok(Verdict::Accepted)
    }

    /// Records of an accepted video, `None` when it is rejected.
    pub fn accept_and_convert(
        &self,
        identifier: &str,
        lines: &[CharLine],
    ) -> Result<Option<Vec<TelemetryRecord>>, TelemetryError> {
        if let Verdict::Rejected(reason) = self.check_lines(identifier, lines)? {
            info!("🚫 Rejected {}: {}", identifier, reason);
            return Ok(None);
        }

        Ok(Some(self.records(lines)))
    }

    /// Lines holding both a time and a fix, in order.
    pub fn records(&self, lines: &[CharLine]) -> Vec<TelemetryRecord> {
        lines
            .iter()
            .map(|line| self.convert_line(line))
            .filter_map(|sample| match (sample.timestamp, sample.point.valid) {
                (Some(timestamp), true) => Some(TelemetryRecord {
                    timestamp,
                    lon: sample.point.lon,
                    lat: sample.point.lat,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn convert_line(&self, line: &CharLine) -> TelemetrySample {
        TelemetrySample {
            timestamp: line_time(line, &self.tz),
            point: extract_point(line),
        }
    }

    fn read_point(&self, index: usize, line: &CharLine) -> SimplePoint {
        match read_position(line.left()) {
            PositionReading::Fix(point) => point,
            PositionReading::NotReady => SimplePoint::invalid(),
            PositionReading::Unreadable => {
                warn!("⚠️ Line {}: unreadable position {:?}", index, line.left());
                SimplePoint::invalid()
            }
        }
    }
}
