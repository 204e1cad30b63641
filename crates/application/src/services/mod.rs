//! Application services

mod history_service;
mod prediction_service;
mod stats_engine;
mod summary_service;

pub use history_service::{HistoryService, SkipReason, YearOutcome, record_from_sample};
pub use prediction_service::{Prediction, PredictionRequest, PredictionService};
pub use stats_engine::{
    DEFAULT_RAIN_THRESHOLD, DEFAULT_SNOW_THRESHOLD, StatsConfig, StatsEngine,
    exceedance_probability, mean,
};
pub use summary_service::{SummaryService, build_prompt, stats_payload};
