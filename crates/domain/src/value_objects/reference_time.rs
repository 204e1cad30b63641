//! Reference time value object
//!
//! The wall-clock instant a prediction is asked for. The offset, when given, is
//! carried for display only; hour, day and month are read as written.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::DomainError;

/// Accepted layouts for date-times without an offset
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Accepted layouts for date-times with an offset but no seconds
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%MZ"];

/// A requested date-time, optionally with the UTC offset it was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceTime {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl ReferenceTime {
    /// Build from a wall-clock date-time without offset
    #[must_use]
    pub const fn from_naive(local: NaiveDateTime) -> Self {
        Self {
            local,
            offset: None,
        }
    }

    /// Build from an offset-aware date-time, keeping its wall-clock fields
    #[must_use]
    pub fn from_fixed(datetime: DateTime<FixedOffset>) -> Self {
        Self {
            local: datetime.naive_local(),
            offset: Some(*datetime.offset()),
        }
    }

    /// Parse an ISO-8601 date-time
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateTime` if no accepted layout matches.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let input = input.trim();

        if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
            return Ok(Self::from_fixed(datetime));
        }

        for format in OFFSET_FORMATS {
            if format.ends_with('Z') {
                if let Ok(local) = NaiveDateTime::parse_from_str(input, format) {
                    return Ok(Self {
                        local,
                        offset: FixedOffset::east_opt(0),
                    });
                }
            } else if let Ok(datetime) = DateTime::parse_from_str(input, format) {
                return Ok(Self::from_fixed(datetime));
            }
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .map(Self::from_naive)
            .ok_or_else(|| DomainError::InvalidDateTime(input.to_string()))
    }

    /// Hour of day (0-23)
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    /// Day of month (1-31)
    #[must_use]
    pub fn day(&self) -> u32 {
        self.local.day()
    }

    /// Month (1-12)
    #[must_use]
    pub fn month(&self) -> u32 {
        self.local.month()
    }

    /// ISO-8601 rendering: seconds always present, microseconds only when
    /// non-zero, offset only when one was supplied
    #[must_use]
    pub fn iso(&self) -> String {
        let mut out = self.local.format("%Y-%m-%dT%H:%M:%S").to_string();

        let micros = self.local.nanosecond() / 1_000;
        if micros != 0 {
            out.push_str(&format!(".{micros:06}"));
        }

        if let Some(offset) = self.offset {
            let seconds = offset.local_minus_utc();
            let sign = if seconds < 0 { '-' } else { '+' };
            let seconds = seconds.abs();
            out.push_str(&format!(
                "{sign}{:02}:{:02}",
                seconds / 3600,
                (seconds % 3600) / 60
            ));
        }

        out
    }

    /// Response stamp `YYYY-MM-DDTHH:MM:SSZ` built from the wall-clock fields
    #[must_use]
    pub fn reference_stamp(&self) -> String {
        self.local.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl FromStr for ReferenceTime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReferenceTime {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReferenceTime> for String {
    fn from(value: ReferenceTime) -> Self {
        value.iso()
    }
}

impl fmt::Display for ReferenceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_naive_with_seconds() {
        let time = ReferenceTime::parse("2025-01-15T14:00:00").expect("should parse");
        assert_eq!((time.hour(), time.day(), time.month()), (14, 15, 1));
        assert!(time.offset.is_none());
        assert_eq!(time.iso(), "2025-01-15T14:00:00");
        assert_eq!(time.reference_stamp(), "2025-01-15T14:00:00Z");
    }

    #[test]
    fn parses_naive_without_seconds() {
        let time = ReferenceTime::parse("2025-07-04T09:30").expect("should parse");
        assert_eq!(time.iso(), "2025-07-04T09:30:00");
    }

    #[test]
    fn parses_utc_designator() {
        let time = ReferenceTime::parse("2025-01-15T14:00:00Z").expect("should parse");
        assert_eq!(time.iso(), "2025-01-15T14:00:00+00:00");
        assert_eq!(time.reference_stamp(), "2025-01-15T14:00:00Z");
    }

    #[test]
    fn keeps_wall_clock_fields_of_offset_times() {
        let time = ReferenceTime::parse("2025-03-01T22:15:00-03:00").expect("should parse");
        assert_eq!((time.hour(), time.day(), time.month()), (22, 1, 3));
        assert_eq!(time.iso(), "2025-03-01T22:15:00-03:00");
        assert_eq!(time.reference_stamp(), "2025-03-01T22:15:00Z");
    }

    #[test]
    fn parses_offset_without_seconds() {
        let time = ReferenceTime::parse("2025-03-01T22:15+05:30").expect("should parse");
        assert_eq!(time.iso(), "2025-03-01T22:15:00+05:30");
    }

    #[test]
    fn renders_fractional_seconds_as_micros() {
        let time = ReferenceTime::parse("2025-01-15T14:00:00.25").expect("should parse");
        assert_eq!(time.iso(), "2025-01-15T14:00:00.250000");
        assert_eq!(time.reference_stamp(), "2025-01-15T14:00:00Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(ReferenceTime::parse("tomorrow").is_err());
        assert!(ReferenceTime::parse("2025-13-01T00:00:00").is_err());
        assert!(ReferenceTime::parse("").is_err());
    }

    #[test]
    fn serde_round_trips_through_iso_string() {
        let time: ReferenceTime =
            serde_json::from_str("\"2025-01-15T14:00:00\"").expect("deserialize");
        let json = serde_json::to_string(&time).expect("serialize");
        assert_eq!(json, "\"2025-01-15T14:00:00\"");
    }
}
