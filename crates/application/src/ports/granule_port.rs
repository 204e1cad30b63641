//! Granule port
//!
//! One remote lookup in the reanalysis archive for one year of the lookback window.

use std::collections::BTreeMap;

use async_trait::async_trait;
use domain::{GeoLocation, HistoryQuery, WeatherVariable};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Raw values read from the grid cell nearest to the requested coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct GridSample {
    /// Coordinate of the snapped grid cell
    pub grid: GeoLocation,
    /// Archive-native value per variable; `None` when the lookup failed
    pub raw: BTreeMap<WeatherVariable, Option<f64>>,
}

impl GridSample {
    /// Create a sample with no values
    pub fn new(grid: GeoLocation) -> Self {
        Self {
            grid,
            raw: BTreeMap::new(),
        }
    }

    /// Add a raw value
    #[must_use]
    pub fn with_raw(mut self, variable: WeatherVariable, value: Option<f64>) -> Self {
        self.raw.insert(variable, value);
        self
    }

    /// Raw value for a variable, `None` when absent
    pub fn raw(&self, variable: WeatherVariable) -> Option<f64> {
        self.raw.get(&variable).copied().flatten()
    }
}

/// Port for per-year archive lookups
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GranulePort: Send + Sync {
    /// Sample the archive for `year` at the query's hour, day, month and location
    ///
    /// Returns `Ok(None)` when the archive holds no granule for the window.
    async fn sample_year(
        &self,
        query: &HistoryQuery,
        year: i32,
    ) -> Result<Option<GridSample>, ApplicationError>;
}
