//! Prediction service - the full request pipeline
//!
//! history -> statistics -> summary

use std::{fmt, sync::Arc};

use domain::{GeoLocation, HistoryQuery, ReferenceTime, StatsBundle};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    error::ApplicationError,
    services::{HistoryService, StatsEngine, SummaryService},
};

/// A validated prediction request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub location: GeoLocation,
    pub reference: ReferenceTime,
}

/// Outcome of the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Snapped grid cell of the last collected year
    pub grid: GeoLocation,
    pub reference: ReferenceTime,
    pub stats: StatsBundle,
    pub summary: String,
    /// Number of years that contributed
    pub years_sampled: usize,
}

/// Runs history collection, statistics and summary for a request
pub struct PredictionService {
    history: HistoryService,
    stats: StatsEngine,
    summary: SummaryService,
}

impl fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionService")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl PredictionService {
    pub const fn new(history: HistoryService, stats: StatsEngine, summary: SummaryService) -> Self {
        Self {
            history,
            stats,
            summary,
        }
    }

    /// Produce a prediction
    ///
    /// Fails with `NoData` when no lookback year returned data and with
    /// `Generation` when the summary could not be produced.
    #[instrument(skip(self), fields(location = %request.location, reference = %request.reference))]
    pub async fn predict(
        &self,
        request: PredictionRequest,
    ) -> Result<Prediction, ApplicationError> {
        let query = HistoryQuery::from_reference(&request.reference, request.location);
        let history = self.history.fetch(&query).await?;
        let stats = self.stats.compute(&history);
        let summary = self
            .summary
            .summarize(&stats, &request.reference.iso())
            .await?;

        info!(years = history.year_count(), grid = %history.grid(), "Prediction ready");

        Ok(Prediction {
            grid: history.grid(),
            reference: request.reference,
            stats,
            summary,
            years_sampled: history.year_count(),
        })
    }

    /// Check if the summary backend is healthy
    pub async fn is_ready(&self) -> bool {
        self.summary.is_healthy().await
    }

    /// Name of the summary model
    pub fn summary_model(&self) -> String {
        self.summary.current_model()
    }
}
