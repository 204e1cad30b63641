//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod gemini_inference_adapter;
mod gldas_granule_adapter;

pub use gemini_inference_adapter::GeminiInferenceAdapter;
pub use gldas_granule_adapter::{GldasGranuleAdapter, archive_variable};
