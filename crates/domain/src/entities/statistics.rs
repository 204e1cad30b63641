//! Aggregated statistics over a history bundle

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::{GeoLocation, WeatherVariable};

/// Mean and, for threshold variables, exceedance probability
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableStats {
    /// Mean of the present values, `None` when every value was missing
    pub mean: Option<f64>,
    /// Share of years at or above the threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

/// Statistics for every tracked variable at one grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsBundle {
    grid: GeoLocation,
    variables: BTreeMap<WeatherVariable, VariableStats>,
}

impl StatsBundle {
    pub fn new(grid: GeoLocation, variables: BTreeMap<WeatherVariable, VariableStats>) -> Self {
        Self { grid, variables }
    }

    pub const fn grid(&self) -> GeoLocation {
        self.grid
    }

    /// Stats for a variable; a variable never computed reads as all-missing
    pub fn get(&self, variable: WeatherVariable) -> VariableStats {
        self.variables.get(&variable).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeatherVariable, VariableStats)> + '_ {
        self.variables.iter().map(|(k, v)| (*k, *v))
    }
}
