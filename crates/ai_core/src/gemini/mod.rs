//! Google Gemini inference engine
//!
//! Talks to the `generateContent` endpoint of the Generative Language REST API.

mod client;
mod models;

pub use client::GeminiInferenceEngine;
