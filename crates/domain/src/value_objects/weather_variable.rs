//! The seven tracked weather variables

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kelvin offset for Celsius conversion
const KELVIN_OFFSET: f64 = 273.15;

/// Seconds per hour, for per-second rates
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Grams per kilogram, for specific humidity
const GRAMS_PER_KILOGRAM: f64 = 1000.0;

/// A physical variable sampled from the reanalysis archive
///
/// The serialized name of each variant is the key used in API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeatherVariable {
    /// Near-surface air temperature
    #[serde(rename = "temperatura_ar")]
    AirTemperature,
    /// Rainfall rate
    #[serde(rename = "precipitacao")]
    Precipitation,
    /// Snowfall rate
    #[serde(rename = "neve")]
    Snowfall,
    /// Near-surface wind speed
    #[serde(rename = "vento")]
    WindSpeed,
    /// Downward shortwave radiation
    #[serde(rename = "radiacao_solar")]
    SolarRadiation,
    /// Specific humidity
    #[serde(rename = "umidade_do_ar")]
    AirHumidity,
    /// Soil moisture in the top 10 cm
    #[serde(rename = "umidade_do_solo")]
    SoilMoisture,
}

impl WeatherVariable {
    /// Every tracked variable, in response order
    pub const ALL: [Self; 7] = [
        Self::AirTemperature,
        Self::Precipitation,
        Self::Snowfall,
        Self::WindSpeed,
        Self::SolarRadiation,
        Self::AirHumidity,
        Self::SoilMoisture,
    ];

    /// Response key for this variable
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::AirTemperature => "temperatura_ar",
            Self::Precipitation => "precipitacao",
            Self::Snowfall => "neve",
            Self::WindSpeed => "vento",
            Self::SolarRadiation => "radiacao_solar",
            Self::AirHumidity => "umidade_do_ar",
            Self::SoilMoisture => "umidade_do_solo",
        }
    }

    /// Unit of the converted value
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::AirTemperature => "°C",
            Self::Precipitation | Self::Snowfall => "mm/h",
            Self::WindSpeed => "m/s",
            Self::SolarRadiation => "W/m²",
            Self::AirHumidity => "g/kg",
            Self::SoilMoisture => "kg/m²",
        }
    }

    /// Whether a threshold-exceedance probability is reported for this variable
    #[must_use]
    pub const fn has_threshold(&self) -> bool {
        matches!(self, Self::Precipitation | Self::Snowfall)
    }

    /// Convert a raw archive value into the reported unit
    ///
    /// Kelvin to Celsius, per-second rates to per-hour rates, kg/kg to g/kg.
    #[must_use]
    pub fn convert(&self, raw: f64) -> f64 {
        match self {
            Self::AirTemperature => raw - KELVIN_OFFSET,
            Self::Precipitation | Self::Snowfall => raw * SECONDS_PER_HOUR,
            Self::AirHumidity => raw * GRAMS_PER_KILOGRAM,
            Self::WindSpeed | Self::SolarRadiation | Self::SoilMoisture => raw,
        }
    }
}

impl fmt::Display for WeatherVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rounding::round_to;

    #[test]
    fn kelvin_to_celsius() {
        let converted = round_to(WeatherVariable::AirTemperature.convert(300.0), 3);
        assert!((converted - 26.85).abs() < f64::EPSILON);
    }

    #[test]
    fn rates_become_hourly() {
        for variable in [WeatherVariable::Precipitation, WeatherVariable::Snowfall] {
            let converted = round_to(variable.convert(0.0001), 3);
            assert!((converted - 0.36).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn humidity_becomes_grams_per_kilogram() {
        let converted = round_to(WeatherVariable::AirHumidity.convert(0.0125), 3);
        assert!((converted - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn pass_through_variables_are_unchanged() {
        for variable in [
            WeatherVariable::WindSpeed,
            WeatherVariable::SolarRadiation,
            WeatherVariable::SoilMoisture,
        ] {
            assert!((variable.convert(4.2) - 4.2).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn only_rain_and_snow_have_thresholds() {
        let with_threshold: Vec<_> = WeatherVariable::ALL
            .iter()
            .filter(|v| v.has_threshold())
            .collect();
        assert_eq!(
            with_threshold,
            vec![&WeatherVariable::Precipitation, &WeatherVariable::Snowfall]
        );
    }

    #[test]
    fn serialized_name_matches_key() {
        for variable in WeatherVariable::ALL {
            let json = serde_json::to_string(&variable).expect("serialize");
            assert_eq!(json, format!("\"{}\"", variable.key()));
        }
    }

    #[test]
    fn units() {
        assert_eq!(WeatherVariable::AirTemperature.unit(), "°C");
        assert_eq!(WeatherVariable::Snowfall.unit(), "mm/h");
        assert_eq!(WeatherVariable::SolarRadiation.unit(), "W/m²");
        assert_eq!(WeatherVariable::SoilMoisture.unit(), "kg/m²");
    }
}
