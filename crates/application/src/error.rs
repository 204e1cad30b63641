//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Every lookback year was skipped
    #[error("no data returned for requested history")]
    NoData,

    /// The summary model failed or returned nothing usable
    #[error("Summary generation failed: {0}")]
    Generation(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Request could not be interpreted
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether the failure came from a remote collaborator
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::ExternalService(_) | Self::Generation(_))
    }
}
