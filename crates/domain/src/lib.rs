//! Domain layer for Clima
//!
//! Contains the climate-history vocabulary: the seven tracked weather variables,
//! per-year samples, aggregated statistics and the value objects used to address
//! them (location, reference time, lookback window).
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod rounding;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
