//! Yearly samples collected from the reanalysis history

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{errors::DomainError, value_objects::GeoLocation, value_objects::WeatherVariable};

/// Converted values for one sampled year; `None` marks a missing value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    year: i32,
    values: BTreeMap<WeatherVariable, Option<f64>>,
}

impl YearRecord {
    /// Create a record with every variable missing
    #[must_use]
    pub fn new(year: i32) -> Self {
        Self {
            year,
            values: WeatherVariable::ALL.iter().map(|v| (*v, None)).collect(),
        }
    }

    /// Set the value for a variable
    #[must_use]
    pub fn with_value(mut self, variable: WeatherVariable, value: Option<f64>) -> Self {
        self.set(variable, value);
        self
    }

    /// Set the value for a variable in place
    pub fn set(&mut self, variable: WeatherVariable, value: Option<f64>) {
        self.values.insert(variable, value);
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Value for a variable, `None` when missing
    pub fn value(&self, variable: WeatherVariable) -> Option<f64> {
        self.values.get(&variable).copied().flatten()
    }

    /// Iterate over all variables in declaration order
    pub fn values(&self) -> impl Iterator<Item = (WeatherVariable, Option<f64>)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

/// Records for every year that produced data, with the grid cell of the last one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryBundle {
    grid: GeoLocation,
    records: Vec<YearRecord>,
}

impl HistoryBundle {
    /// Create a bundle
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyHistory` if `records` is empty.
    pub fn new(grid: GeoLocation, records: Vec<YearRecord>) -> Result<Self, DomainError> {
        if records.is_empty() {
            return Err(DomainError::EmptyHistory);
        }
        Ok(Self { grid, records })
    }

    /// Snapped grid cell coordinate
    pub const fn grid(&self) -> GeoLocation {
        self.grid
    }

    pub fn records(&self) -> &[YearRecord] {
        &self.records
    }

    /// Number of years that produced a record
    pub fn year_count(&self) -> usize {
        self.records.len()
    }

    /// One entry per year for a variable, missing values included
    pub fn samples(&self, variable: WeatherVariable) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.value(variable)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GeoLocation {
        GeoLocation::new(-23.625, -46.625).expect("valid")
    }

    #[test]
    fn new_record_has_every_variable_missing() {
        let record = YearRecord::new(2024);
        assert_eq!(record.values().count(), WeatherVariable::ALL.len());
        assert!(record.values().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn with_value_sets_single_variable() {
        let record = YearRecord::new(2024).with_value(WeatherVariable::AirTemperature, Some(25.1));
        assert_eq!(record.value(WeatherVariable::AirTemperature), Some(25.1));
        assert_eq!(record.value(WeatherVariable::Precipitation), None);
    }

    #[test]
    fn empty_history_is_rejected() {
        assert_eq!(
            HistoryBundle::new(grid(), vec![]),
            Err(DomainError::EmptyHistory)
        );
    }

    #[test]
    fn samples_keep_missing_entries_in_year_order() {
        let bundle = HistoryBundle::new(
            grid(),
            vec![
                YearRecord::new(2024).with_value(WeatherVariable::WindSpeed, Some(1.0)),
                YearRecord::new(2023),
                YearRecord::new(2022).with_value(WeatherVariable::WindSpeed, Some(3.0)),
            ],
        )
        .expect("non-empty");

        assert_eq!(bundle.year_count(), 3);
        assert_eq!(
            bundle.samples(WeatherVariable::WindSpeed),
            vec![Some(1.0), None, Some(3.0)]
        );
        assert_eq!(bundle.records()[0].year(), 2024);
    }
}
