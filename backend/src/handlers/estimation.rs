//! HTTP handler for schedule estimation

use axum::{response::IntoResponse, Json};

use crate::error::{AppError, AppResult};
use shared::{estimator, validate_harvest_input, HarvestInput};

/// Compute a production schedule forecast. Pure computation; nothing is
/// stored.
pub async fn estimate_schedule(Json(input): Json<HarvestInput>) -> AppResult<impl IntoResponse> {
    validate_harvest_input(&input).map_err(|msg| AppError::ValidationError(msg.to_string()))?;

    let result =
        estimator::estimate(&input).map_err(|e| AppError::ValidationError(e.to_string()))?;
    Ok(Json(result))
}
