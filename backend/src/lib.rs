//! Kopi Nglurah Production Tracker - Backend
//!
//! Tracks coffee-processing batches (cherry → greenbean) for the farmer
//! cooperative: schedule estimation, active batch tracking through the
//! fixed pipeline, and the historical archive.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn store::DocumentStore>,
    pub config: Arc<Config>,
}
