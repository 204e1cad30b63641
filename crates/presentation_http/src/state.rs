//! Application state shared across handlers

use std::sync::Arc;

use application::PredictionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Runs the history, statistics and summary pipeline
    pub prediction_service: Arc<PredictionService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("prediction_service", &self.prediction_service)
            .finish()
    }
}

impl AppState {
    pub fn new(prediction_service: PredictionService) -> Self {
        Self {
            prediction_service: Arc::new(prediction_service),
        }
    }
}
