//! Application layer - Use cases and orchestration
//!
//! Contains the prediction pipeline (history, statistics, summary) and the
//! port definitions its adapters implement.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
