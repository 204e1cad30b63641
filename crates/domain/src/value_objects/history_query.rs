//! Time-of-year query against the reanalysis history

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{GeoLocation, LookbackWindow, ReferenceTime};
use crate::errors::DomainError;

/// Length of the search window opened at the requested hour
pub const WINDOW_HOURS: i64 = 2;

/// The hour/day/month and location to sample in every lookback year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Hour of day (0-23)
    pub hour: u32,
    /// Day of month (1-31)
    pub day: u32,
    /// Month (1-12)
    pub month: u32,
    /// Requested coordinate
    pub location: GeoLocation,
}

impl HistoryQuery {
    /// Create a query from explicit fields
    #[must_use]
    pub const fn new(hour: u32, day: u32, month: u32, location: GeoLocation) -> Self {
        Self {
            hour,
            day,
            month,
            location,
        }
    }

    /// Create a query from a reference time's wall-clock fields
    #[must_use]
    pub fn from_reference(reference: &ReferenceTime, location: GeoLocation) -> Self {
        Self::new(reference.hour(), reference.day(), reference.month(), location)
    }

    /// Years to sample for this query
    #[must_use]
    pub const fn lookback(&self) -> LookbackWindow {
        LookbackWindow::for_month(self.month)
    }

    /// Search window `[start, start + 2h]` for `year`
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateTime` when the day does not exist in
    /// that year (29 February outside leap years) or the hour is out of range.
    pub fn window(&self, year: i32) -> Result<(NaiveDateTime, NaiveDateTime), DomainError> {
        let start = NaiveDate::from_ymd_opt(year, self.month, self.day)
            .and_then(|date| date.and_hms_opt(self.hour, 0, 0))
            .ok_or_else(|| {
                DomainError::InvalidDateTime(format!(
                    "{year}-{:02}-{:02} {:02}h does not exist",
                    self.month, self.day, self.hour
                ))
            })?;
        Ok((start, start + Duration::hours(WINDOW_HOURS)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sao_paulo() -> GeoLocation {
        GeoLocation::new(-23.5, -46.6).expect("valid")
    }

    #[test]
    fn from_reference_copies_wall_clock_fields() {
        let reference = ReferenceTime::parse("2025-01-15T14:00:00").expect("valid");
        let query = HistoryQuery::from_reference(&reference, sao_paulo());
        assert_eq!((query.hour, query.day, query.month), (14, 15, 1));
    }

    #[test]
    fn window_spans_two_hours() {
        let query = HistoryQuery::new(23, 31, 12, sao_paulo());
        let (start, end) = query.window(2023).expect("valid date");
        assert_eq!(start.to_string(), "2023-12-31 23:00:00");
        assert_eq!(end.to_string(), "2024-01-01 01:00:00");
    }

    #[test]
    fn leap_day_fails_in_common_years() {
        let query = HistoryQuery::new(12, 29, 2, sao_paulo());
        assert!(query.window(2024).is_ok());
        assert!(matches!(
            query.window(2023),
            Err(DomainError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn lookback_follows_month() {
        assert_eq!(HistoryQuery::new(0, 1, 5, sao_paulo()).lookback().anchor(), 2025);
        assert_eq!(HistoryQuery::new(0, 1, 6, sao_paulo()).lookback().anchor(), 2024);
    }
}
