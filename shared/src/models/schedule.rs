//! Production schedule models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Stage;

/// One row of the estimated schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub stage: Stage,
    pub start_date: NaiveDate,
    /// Last day of the stage, inclusive
    pub end_date: NaiveDate,
    /// Computed duration in days. Scheduling floors this at one calendar
    /// day, but the reported value keeps the raw figure.
    pub duration_days: u32,
}

/// Forecast produced by the schedule estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    /// One entry per pipeline stage, in pipeline order
    pub schedule: Vec<ScheduleEntry>,
    pub completion_date: NaiveDate,
    /// Sum of reported stage durations, not the wall-clock span
    pub total_days: u32,
    /// Expected finished product in kilograms
    pub estimated_yield_kg: Decimal,
}
