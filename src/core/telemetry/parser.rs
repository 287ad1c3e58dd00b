use chrono::{NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::telemetry::TelemetryError;
use crate::core::video::CharLine;

/// speed, 7 filler chars, lat degrees, lat millionths, 2 filler chars,
/// lon degrees, lon millionths
static POSITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d{1,3}.{7}\s*(\d{1,2})\s*(\d{1,6}).{2}\s*(\d{1,3})\s*(\d{1,6})")
        .expect("position pattern compiles")
});

/// Length of `YYYYMMDDhhmmss_xxxxxx.TS`
pub const RECORD_NAME_LEN: usize = 24;

const START_STAMP_LEN: usize = 14;
const LINE_TIME_LEN: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimplePoint {
    pub valid: bool,
    pub lon: f64,
    pub lat: f64,
}

impl SimplePoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            valid: true,
            lon,
            lat,
        }
    }

    pub fn invalid() -> Self {
        Self::default()
    }
}

/// What the left half of a line says about position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionReading {
    /// Blank or all zero, the receiver has no fix yet
    NotReady,
    /// Text present but not in the expected shape
    Unreadable,
    Fix(SimplePoint),
}

/// 解析左半行中的经纬度
///
/// Latitude is north and longitude west; the overlay prints no hemisphere.
pub fn read_position(left: &str) -> PositionReading {
    if left.trim().is_empty() {
        return PositionReading::NotReady;
    }

    let Some(caps) = POSITION_RE.captures(left) else {
        return PositionReading::Unreadable;
    };
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (Some(lat_deg), Some(lat_frac), Some(lon_deg), Some(lon_frac)) =
        (field(1), field(2), field(3), field(4))
    else {
        return PositionReading::Unreadable;
    };

    if lat_deg == 0 && lat_frac == 0 && lon_deg == 0 && lon_frac == 0 {
        return PositionReading::NotReady;
    }

    let lat = lat_deg as f64 + lat_frac as f64 * 1e-6;
    let lon = -(lon_deg as f64 + lon_frac as f64 * 1e-6);
    PositionReading::Fix(SimplePoint::new(lat, lon))
}

pub fn extract_point(line: &CharLine) -> SimplePoint {
    match read_position(line.left()) {
        PositionReading::Fix(point) => point,
        PositionReading::NotReady | PositionReading::Unreadable => SimplePoint::invalid(),
    }
}

/// Overlay clock of a line, `dd mm YYYY HH MM SS` ending one character
/// before the end of the right half.
pub fn line_time<Tz: TimeZone>(line: &CharLine, tz: &Tz) -> Option<i64> {
    let right = line.right();
    let start = right.len().checked_sub(LINE_TIME_LEN + 1)?;
    let text = right.get(start..start + LINE_TIME_LEN)?;
    let naive = NaiveDateTime::parse_from_str(text, "%d %m %Y %H %M %S").ok()?;
    local_timestamp(&naive, tz)
}

/// Trailing `YYYYMMDDhhmmss_xxxxxx.TS` of a source identifier.
pub fn record_name(identifier: &str) -> Result<&str, TelemetryError> {
    identifier
        .len()
        .checked_sub(RECORD_NAME_LEN)
        .and_then(|start| identifier.get(start..))
        .ok_or_else(|| TelemetryError::InvalidSourceName(identifier.to_string()))
}

/// Recording start encoded in the source identifier.
pub fn nominal_start<Tz: TimeZone>(identifier: &str, tz: &Tz) -> Result<i64, TelemetryError> {
    let invalid = || TelemetryError::InvalidSourceName(identifier.to_string());

    let stamp = record_name(identifier)?
        .get(..START_STAMP_LEN)
        .ok_or_else(invalid)?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S").map_err(|_| invalid())?;
    local_timestamp(&naive, tz).ok_or_else(invalid)
}

/// Ambiguous local times resolve to the earlier instant; skipped ones
/// have none.
fn local_timestamp<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<i64> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn line(left: &str, right: &str) -> CharLine {
        CharLine::new(format!("{:<71}", left), format!("{:>71}", right))
    }

    #[test]
    fn test_read_position() {
        let point = extract_point(&line(" 100 __ _ _26 434600 _71 608715", ""));

        assert!(point.valid);
        assert!((point.lat - 26.4346).abs() < 1e-9);
        assert!((point.lon + 71.608715).abs() < 1e-9);
    }

    #[test]
    fn test_short_speed_and_trailing_text() {
        let point = extract_point(&line(
            " 20 __ _ _26 439807 _71 591485            1",
            "",
        ));
        assert!(point.valid);
        assert!((point.lat - 26.439807).abs() < 1e-9);

        let point = extract_point(&line(" 8 __ _ _26 436033 _71 614916  ", ""));
        assert!((point.lon + 71.614916).abs() < 1e-9);
    }

    #[test]
    fn test_corrupted_separator_still_reads() {
        let point = extract_point(&line(" 20 __ _ _26 439788 171 591485 ", ""));

        assert!(point.valid);
        assert!((point.lon + 71.591485).abs() < 1e-9);
    }

    #[test]
    fn test_no_fix_yet() {
        assert_eq!(read_position(&" ".repeat(71)), PositionReading::NotReady);
        assert_eq!(read_position(""), PositionReading::NotReady);
        assert_eq!(
            read_position(" 0 __ _ 00 000000 00 000000    "),
            PositionReading::NotReady
        );
    }

    #[test]
    fn test_unreadable_left() {
        assert_eq!(read_position("  __ _ garbage"), PositionReading::Unreadable);
        assert_eq!(read_position(" 20 __"), PositionReading::Unreadable);
        assert!(!extract_point(&line("  __ _ garbage", "")).valid);
    }

    #[test]
    fn test_extract_point_idempotent() {
        let l = line(" 95 __ _ _26 435985 _71 612824 ", "");
        assert_eq!(extract_point(&l), extract_point(&l));
    }

    #[test]
    fn test_line_time() {
        let l = line("", "31 08 2024 09 02 20 ");

        assert_eq!(line_time(&l, &Utc), Some(1_725_094_940));

        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(line_time(&l, &est), Some(1_725_094_940 + 5 * 3600));
    }

    #[test]
    fn test_line_time_unreadable() {
        assert_eq!(line_time(&line("", ""), &Utc), None);
        assert_eq!(line_time(&line("", "31 08 2024 09 02 2x "), &Utc), None);
        assert_eq!(line_time(&line("", "32 08 2024 09 02 20 "), &Utc), None);
        assert_eq!(line_time(&CharLine::new("", "short"), &Utc), None);
    }

    #[test]
    fn test_record_name() {
        assert_eq!(
            record_name("file:../data/20240831090220_004709.TS").unwrap(),
            "20240831090220_004709.TS"
        );
        assert_eq!(
            record_name("20240831090220_004709.TS").unwrap(),
            "20240831090220_004709.TS"
        );
        assert!(matches!(
            record_name("0831090220_004709.TS"),
            Err(TelemetryError::InvalidSourceName(_))
        ));
    }

    #[test]
    fn test_nominal_start() {
        assert_eq!(
            nominal_start("file:RO/20240831090220_004709.TS", &Utc).unwrap(),
            1_725_094_940
        );
        assert!(nominal_start("file:RO/2024083109022x_004709.TS", &Utc).is_err());
        assert!(nominal_start("x.TS", &Utc).is_err());
    }
}
