//! GLDAS reanalysis integration
//!
//! Client for NASA Earthdata: granule search through the Common Metadata
//! Repository (CMR) and point extraction from granules through OPeNDAP.
//! Requests carry an Earthdata Login bearer token.

mod auth;
pub mod client;
mod models;
pub mod opendap;

pub use client::{GldasClient, GldasConfig, GldasError, GranuleArchive, PointSample};
pub use models::Granule;
pub use opendap::{FILL_VALUE, nearest_index};
