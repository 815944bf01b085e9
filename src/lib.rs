//! NSC - EESP analysis and prediction service.
//!
//! Loads the new-service-connection dataset, reports summary statistics and
//! answers future demand predictions over HTTP.

pub mod api;
pub mod config;
pub mod dataset;
pub mod demand;
pub mod ml;
pub mod resources;
pub mod telemetry;
