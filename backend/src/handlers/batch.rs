//! HTTP handlers for batch tracking

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::batch::{AdvanceBatchInput, BatchService, CreateBatchInput};
use crate::AppState;

use super::OwnerQuery;

/// Request body for starting a new batch
#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    pub owner_email: String,
    #[serde(flatten)]
    pub input: CreateBatchInput,
}

/// Start a new batch
pub async fn create_batch(
    State(state): State<AppState>,
    Json(request): Json<CreateBatchRequest>,
) -> AppResult<impl IntoResponse> {
    let service = BatchService::new(state.store.clone());
    let batch = service
        .create_batch(&request.owner_email, request.input)
        .await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// List all active batches for an owner
pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> AppResult<impl IntoResponse> {
    let owner = query.checked()?;
    let service = BatchService::new(state.store.clone());
    let batches = service.list_active(&owner).await?;
    Ok(Json(serde_json::json!({ "batches": batches })))
}

/// Get one active batch by id
pub async fn get_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = BatchService::new(state.store.clone());
    let batch = service.get_batch(&batch_id).await?;
    Ok(Json(batch))
}

/// Close the current stage and open the next one; archives the batch when
/// the pipeline is done
pub async fn advance_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
    Json(input): Json<AdvanceBatchInput>,
) -> AppResult<impl IntoResponse> {
    let service = BatchService::new(state.store.clone());
    let outcome = service.advance(&batch_id, input).await?;
    Ok(Json(outcome))
}
