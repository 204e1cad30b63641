//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod granule_port;
mod inference_port;

#[cfg(test)]
pub use granule_port::MockGranulePort;
pub use granule_port::{GranulePort, GridSample};
#[cfg(test)]
pub use inference_port::MockInferencePort;
pub use inference_port::{InferencePort, InferenceResult};
