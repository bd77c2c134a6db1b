//! Shared types and models for the Kopi Nglurah production tracker
//!
//! This crate contains the domain model, the pure schedule estimator, and
//! validation helpers shared between the backend and the browser (via WASM).

pub mod estimator;
pub mod models;
pub mod validation;

pub use estimator::*;
pub use models::*;
pub use validation::*;
