//! Clients for external services

pub mod weather;

pub use weather::OpenMeteoClient;
