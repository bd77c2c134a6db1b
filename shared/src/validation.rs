//! Validation utilities for the Kopi Nglurah production tracker

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{default_group_name, HarvestInput, StageLog, Stage};

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate raw cherry weight
pub fn validate_harvest_quantity(quantity_kg: Decimal) -> Result<(), &'static str> {
    if quantity_kg <= Decimal::ZERO {
        return Err("Harvest quantity must be positive");
    }
    Ok(())
}

/// Validate the whole harvest intake form
pub fn validate_harvest_input(input: &HarvestInput) -> Result<(), &'static str> {
    validate_harvest_quantity(input.quantity_kg)?;
    if input.group_name.trim().is_empty() {
        return Err("Group name cannot be empty");
    }
    Ok(())
}

/// Blank group names fall back to the anonymous label
pub fn normalize_group_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => default_group_name(),
    }
}

/// A stage may not finish before it started
pub fn validate_stage_completion(
    log: &StageLog,
    stage: Stage,
    completion_date: NaiveDate,
) -> Result<(), &'static str> {
    if let Some(started) = log.started(stage) {
        if completion_date < started {
            return Err("Stage completion date is before its start date");
        }
    }
    Ok(())
}
