//! History service
//!
//! Walks the lookback window one year at a time and turns each archive lookup
//! into a yearly record. A failing year is skipped; only an empty history fails.

use std::{fmt, sync::Arc};

use domain::{
    GeoLocation, HistoryBundle, HistoryQuery, WeatherVariable, YearRecord,
    rounding::{MEAN_DECIMALS, round_to},
};
use tracing::{info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{GranulePort, GridSample},
};

/// Why a lookback year produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The archive holds no granule for the window
    NoGranule,
    /// The lookup failed
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoGranule => f.write_str("no granule for window"),
            Self::Failed(reason) => f.write_str(reason),
        }
    }
}

/// Result of sampling one lookback year
#[derive(Debug, Clone, PartialEq)]
pub enum YearOutcome {
    /// The year produced a record at `grid`
    Collected { record: YearRecord, grid: GeoLocation },
    /// The year was skipped
    Skipped { year: i32, reason: SkipReason },
}

impl YearOutcome {
    pub const fn year(&self) -> i32 {
        match self {
            Self::Collected { record, .. } => record.year(),
            Self::Skipped { year, .. } => *year,
        }
    }
}

/// Convert, filter and round one raw archive value
fn normalize(variable: WeatherVariable, raw: Option<f64>) -> Option<f64> {
    raw.filter(|v| v.is_finite())
        .map(|v| variable.convert(v))
        .filter(|v| v.is_finite())
        .map(|v| round_to(v, MEAN_DECIMALS))
}

/// Build the yearly record from a raw grid sample
pub fn record_from_sample(year: i32, sample: &GridSample) -> YearRecord {
    WeatherVariable::ALL
        .into_iter()
        .fold(YearRecord::new(year), |record, variable| {
            record.with_value(variable, normalize(variable, sample.raw(variable)))
        })
}

/// Collects the per-year history for a query
pub struct HistoryService {
    granules: Arc<dyn GranulePort>,
}

impl fmt::Debug for HistoryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryService").finish_non_exhaustive()
    }
}

impl HistoryService {
    /// Create a new history service
    pub fn new(granules: Arc<dyn GranulePort>) -> Self {
        Self { granules }
    }

    /// Sample a single year
    #[instrument(skip(self, query), fields(month = query.month, day = query.day, hour = query.hour))]
    pub async fn sample_year(&self, query: &HistoryQuery, year: i32) -> YearOutcome {
        match self.granules.sample_year(query, year).await {
            Ok(Some(sample)) => {
                let record = record_from_sample(year, &sample);
                info!(year, grid = %sample.grid, "Year collected");
                YearOutcome::Collected {
                    record,
                    grid: sample.grid,
                }
            },
            Ok(None) => {
                warn!(year, "No granule found, skipping year");
                YearOutcome::Skipped {
                    year,
                    reason: SkipReason::NoGranule,
                }
            },
            Err(e) => {
                warn!(year, error = %e, "Year lookup failed, skipping");
                YearOutcome::Skipped {
                    year,
                    reason: SkipReason::Failed(e.to_string()),
                }
            },
        }
    }

    /// Sample every year of the lookback window, newest first
    pub async fn outcomes(&self, query: &HistoryQuery) -> Vec<YearOutcome> {
        let mut outcomes = Vec::new();
        for year in query.lookback().years() {
            outcomes.push(self.sample_year(query, year).await);
        }
        outcomes
    }

    /// Fetch the history bundle for a query
    ///
    /// The bundle's grid cell is the one reported by the last collected year.
    #[instrument(skip(self, query), fields(location = %query.location))]
    pub async fn fetch(&self, query: &HistoryQuery) -> Result<HistoryBundle, ApplicationError> {
        let outcomes = self.outcomes(query).await;
        let skipped = outcomes
            .iter()
            .filter(|o| matches!(o, YearOutcome::Skipped { .. }))
            .count();

        let mut grid = None;
        let mut records = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            if let YearOutcome::Collected { record, grid: cell } = outcome {
                grid = Some(cell);
                records.push(record);
            }
        }

        let grid = grid.ok_or(ApplicationError::NoData)?;
        info!(collected = records.len(), skipped, "History collected");
        Ok(HistoryBundle::new(grid, records)?)
    }
}
