//! Statistics over a history bundle
//!
//! Means ignore missing years. Exceedance probabilities divide by every sampled
//! year, missing ones included.

use std::collections::BTreeMap;

use domain::{
    HistoryBundle, StatsBundle, VariableStats, WeatherVariable,
    rounding::{MEAN_DECIMALS, PROBABILITY_DECIMALS, round_to},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default cutoff for a rainy year, in mm/h
pub const DEFAULT_RAIN_THRESHOLD: f64 = 0.1;

/// Default cutoff for a snowy year, in mm/h
pub const DEFAULT_SNOW_THRESHOLD: f64 = 0.1;

/// Exceedance thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_rain_threshold")]
    pub rain_threshold: f64,
    #[serde(default = "default_snow_threshold")]
    pub snow_threshold: f64,
}

const fn default_rain_threshold() -> f64 {
    DEFAULT_RAIN_THRESHOLD
}

const fn default_snow_threshold() -> f64 {
    DEFAULT_SNOW_THRESHOLD
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            rain_threshold: DEFAULT_RAIN_THRESHOLD,
            snow_threshold: DEFAULT_SNOW_THRESHOLD,
        }
    }
}

/// Mean of the present values, rounded to 3 decimals
pub fn mean(samples: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = samples.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    Some(round_to(mean, MEAN_DECIMALS))
}

/// Share of all samples at or above `threshold`, rounded to 2 decimals
///
/// Missing samples count towards the total but never as a hit.
pub fn exceedance_probability(samples: &[Option<f64>], threshold: f64) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let hits = samples.iter().flatten().filter(|v| **v >= threshold).count();
    Some(round_to(
        hits as f64 / samples.len() as f64,
        PROBABILITY_DECIMALS,
    ))
}

/// Computes per-variable statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsEngine {
    config: StatsConfig,
}

impl StatsEngine {
    pub const fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    /// Threshold for a variable, if it reports a probability
    pub const fn threshold(&self, variable: WeatherVariable) -> Option<f64> {
        match variable {
            WeatherVariable::Precipitation => Some(self.config.rain_threshold),
            WeatherVariable::Snowfall => Some(self.config.snow_threshold),
            _ => None,
        }
    }

    /// Statistics for every variable of `history`
    pub fn compute(&self, history: &HistoryBundle) -> StatsBundle {
        let variables: BTreeMap<_, _> = WeatherVariable::ALL
            .into_iter()
            .map(|variable| {
                let samples = history.samples(variable);
                let stats = VariableStats {
                    mean: mean(&samples),
                    probability: self
                        .threshold(variable)
                        .and_then(|t| exceedance_probability(&samples, t)),
                };
                (variable, stats)
            })
            .collect();

        debug!(years = history.year_count(), "Statistics computed");
        StatsBundle::new(history.grid(), variables)
    }
}
