//! Prediction handler
//!
//! `POST /api/prediction` turns a coordinate and date-time into historical
//! statistics for the same hour of year plus a short written summary.

use application::{Prediction, PredictionRequest};
use axum::{Json, extract::State};
use domain::{GeoLocation, ReferenceTime, StatsBundle, WeatherVariable};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    error::ApiError,
    middleware::{RequestId, ValidatedJson},
    state::AppState,
};

/// Request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictionBody {
    #[validate(range(min = -90.0, max = 90.0, message = "must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "must be between -180 and 180"))]
    pub long: f64,
    #[validate(custom(function = "validate_date"))]
    pub date: String,
}

fn validate_date(date: &str) -> Result<(), validator::ValidationError> {
    ReferenceTime::parse(date).map(|_| ()).map_err(|_| {
        validator::ValidationError::new("iso8601")
            .with_message("must be an ISO-8601 date-time".into())
    })
}

impl TryFrom<PredictionBody> for PredictionRequest {
    type Error = ApiError;

    fn try_from(body: PredictionBody) -> Result<Self, Self::Error> {
        let location = GeoLocation::new(body.lat, body.long)
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let reference =
            ReferenceTime::parse(&body.date).map_err(|e| ApiError::Validation(e.to_string()))?;
        Ok(Self {
            location,
            reference,
        })
    }
}

/// Resolved grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub lat: f64,
    pub long: f64,
}

/// Where and when the statistics apply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Local {
    pub bounding_box: BoundingBox,
    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub data_referencia: String,
}

/// One variable's mean with its unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateValue {
    pub valor: Option<f64>,
    pub unidade: &'static str,
    /// Present (possibly null) only for threshold variables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilidade: Option<Option<f64>>,
}

impl ClimateValue {
    fn from_stats(stats: &StatsBundle, variable: WeatherVariable) -> Self {
        let entry = stats.get(variable);
        Self {
            valor: entry.mean,
            unidade: variable.unit(),
            probabilidade: variable.has_threshold().then_some(entry.probability),
        }
    }
}

/// Per-variable block keyed by the public variable names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clima {
    pub temperatura_ar: ClimateValue,
    pub precipitacao: ClimateValue,
    pub neve: ClimateValue,
    pub vento: ClimateValue,
    pub radiacao_solar: ClimateValue,
    pub umidade_do_ar: ClimateValue,
    pub umidade_do_solo: ClimateValue,
}

impl From<&StatsBundle> for Clima {
    fn from(stats: &StatsBundle) -> Self {
        let value = |variable| ClimateValue::from_stats(stats, variable);
        Self {
            temperatura_ar: value(WeatherVariable::AirTemperature),
            precipitacao: value(WeatherVariable::Precipitation),
            neve: value(WeatherVariable::Snowfall),
            vento: value(WeatherVariable::WindSpeed),
            radiacao_solar: value(WeatherVariable::SolarRadiation),
            umidade_do_ar: value(WeatherVariable::AirHumidity),
            umidade_do_solo: value(WeatherVariable::SoilMoisture),
        }
    }
}

/// Response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub local: Local,
    pub clima: Clima,
    pub resumo: String,
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            local: Local {
                bounding_box: BoundingBox {
                    lat: prediction.grid.latitude(),
                    long: prediction.grid.longitude(),
                },
                data_referencia: prediction.reference.reference_stamp(),
            },
            clima: Clima::from(&prediction.stats),
            resumo: prediction.summary,
        }
    }
}

/// Historical statistics and summary for a coordinate and date-time
///
/// POST /api/prediction
#[instrument(skip_all, fields(request_id = %request_id))]
pub async fn predict(
    State(state): State<AppState>,
    request_id: RequestId,
    ValidatedJson(body): ValidatedJson<PredictionBody>,
) -> Result<Json<PredictionResponse>, ApiError> {
    info!(lat = body.lat, long = body.long, date = %body.date, "Prediction requested");
    let request = PredictionRequest::try_from(body)?;
    let prediction = state.prediction_service.predict(request).await?;

    info!(
        years = prediction.years_sampled,
        grid = %prediction.grid,
        "Prediction served"
    );

    Ok(Json(PredictionResponse::from(prediction)))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use domain::VariableStats;

    use super::*;

    fn stats() -> StatsBundle {
        let grid = GeoLocation::new_unchecked(-23.625, -46.625);
        StatsBundle::new(
            grid,
            BTreeMap::from([
                (
                    WeatherVariable::AirTemperature,
                    VariableStats {
                        mean: Some(25.82),
                        probability: None,
                    },
                ),
                (
                    WeatherVariable::Precipitation,
                    VariableStats {
                        mean: Some(0.144),
                        probability: Some(0.4),
                    },
                ),
            ]),
        )
    }

    fn prediction() -> Prediction {
        let stats = stats();
        Prediction {
            grid: stats.grid(),
            reference: ReferenceTime::parse("2025-01-15T14:00:00-03:00").unwrap(),
            stats,
            summary: "Tarde quente.".to_string(),
            years_sampled: 5,
        }
    }

    #[test]
    fn response_follows_public_schema() {
        let json = serde_json::to_value(PredictionResponse::from(prediction())).unwrap();

        assert_eq!(json["local"]["bounding_box"]["lat"], -23.625);
        assert_eq!(json["local"]["bounding_box"]["long"], -46.625);
        assert_eq!(json["local"]["data_referencia"], "2025-01-15T14:00:00Z");
        assert_eq!(json["clima"]["temperatura_ar"]["valor"], 25.82);
        assert_eq!(json["clima"]["temperatura_ar"]["unidade"], "°C");
        assert!(json["clima"]["temperatura_ar"].get("probabilidade").is_none());
        assert_eq!(json["clima"]["precipitacao"]["probabilidade"], 0.4);
        assert_eq!(json["clima"]["precipitacao"]["unidade"], "mm/h");
        assert_eq!(json["resumo"], "Tarde quente.");
    }

    #[test]
    fn missing_threshold_stats_serialize_as_null() {
        let json = serde_json::to_value(PredictionResponse::from(prediction())).unwrap();

        let neve = &json["clima"]["neve"];
        assert!(neve["valor"].is_null());
        assert!(neve.get("probabilidade").is_some_and(serde_json::Value::is_null));
        assert!(json["clima"]["vento"]["valor"].is_null());
    }

    #[test]
    fn clima_keys_match_variable_keys() {
        let json = serde_json::to_value(Clima::from(&stats())).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();

        assert_eq!(keys.len(), WeatherVariable::ALL.len());
        for variable in WeatherVariable::ALL {
            assert!(keys.contains(&variable.key()), "missing {}", variable.key());
            assert_eq!(json[variable.key()]["unidade"], variable.unit());
        }
    }

    #[test]
    fn body_validation() {
        let body = |lat, long, date: &str| PredictionBody {
            lat,
            long,
            date: date.to_string(),
        };

        assert!(body(-23.5, -46.6, "2025-01-15T14:00:00").validate().is_ok());
        assert!(body(90.5, 0.0, "2025-01-15T14:00:00").validate().is_err());
        assert!(body(0.0, -180.5, "2025-01-15T14:00:00").validate().is_err());
        assert!(body(0.0, 0.0, "15/01/2025").validate().is_err());
    }

    #[test]
    fn body_converts_to_request() {
        let request = PredictionRequest::try_from(PredictionBody {
            lat: -23.5,
            long: -46.6,
            date: "2025-01-15T14:00".to_string(),
        })
        .unwrap();
        assert_eq!(request.reference.hour(), 14);
        assert!((request.location.latitude() - -23.5).abs() < f64::EPSILON);
    }
}
