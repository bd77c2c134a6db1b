//! Business logic services for the production tracker

pub mod batch;
pub mod history;

pub use batch::BatchService;
pub use history::HistoryService;
