//! API error handling
//!
//! Maps application failures onto HTTP statuses and a stable JSON body.
//! Internal details are withheld unless exposure is switched on.

use std::sync::atomic::{AtomicBool, Ordering};

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global flag to control error detail exposure
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Configure whether internal error details are included in responses
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body or failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No lookback year produced data
    #[error("No data: {0}")]
    NoData(String),

    /// The summary model failed
    #[error("Summary generation failed: {0}")]
    GenerationFailed(String),

    /// A remote dependency is unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// HTTP status for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NoData(_) => StatusCode::NOT_FOUND,
            Self::GenerationFailed(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NoData(_) => "no_data",
            Self::GenerationFailed(_) => "generation_failed",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Response body, with upstream and internal details only when `expose` is set
    pub fn body(&self, expose: bool) -> ErrorResponse {
        let (error, details) = match self {
            Self::Validation(msg) | Self::NoData(msg) => (msg.clone(), None),
            Self::GenerationFailed(msg) => (
                "Failed to generate the forecast summary".to_string(),
                expose.then(|| msg.clone()),
            ),
            Self::ServiceUnavailable(msg) => (
                "Service temporarily unavailable".to_string(),
                expose.then(|| msg.clone()),
            ),
            Self::Internal(msg) => (
                "An internal error occurred".to_string(),
                expose.then(|| msg.clone()),
            ),
        };

        ErrorResponse {
            error,
            code: self.code().to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }
        let body = self.body(should_expose_details());
        (self.status(), Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::NoData => Self::NoData(err.to_string()),
            ApplicationError::Domain(e) => Self::Validation(e.to_string()),
            ApplicationError::InvalidRequest(msg) => Self::Validation(msg),
            ApplicationError::Generation(msg) => Self::GenerationFailed(msg),
            ApplicationError::ExternalService(msg) => Self::ServiceUnavailable(msg),
            ApplicationError::Configuration(msg) | ApplicationError::Internal(msg) => {
                Self::Internal(msg)
            },
        }
    }
}
