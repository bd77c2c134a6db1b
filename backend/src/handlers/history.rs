//! HTTP handlers for the production history

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::history::{HistoryService, ManualRecordInput};
use crate::AppState;

use super::OwnerQuery;

/// Request body for recording a completed batch by hand
#[derive(Debug, Deserialize)]
pub struct ManualRecordRequest {
    pub owner_email: String,
    #[serde(flatten)]
    pub input: ManualRecordInput,
}

/// List archived records for an owner
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> AppResult<impl IntoResponse> {
    let owner = query.checked()?;
    let service = HistoryService::new(state.store.clone());
    let records = service.list_history(&owner).await?;
    Ok(Json(serde_json::json!({ "records": records })))
}

/// Get one archived record by id
pub async fn get_history_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = HistoryService::new(state.store.clone());
    let record = service.get_record(&record_id).await?;
    Ok(Json(record))
}

/// Record a completed batch directly into history
pub async fn record_manual_history(
    State(state): State<AppState>,
    Json(request): Json<ManualRecordRequest>,
) -> AppResult<impl IntoResponse> {
    let service = HistoryService::new(state.store.clone());
    let record = service
        .record_manual(&request.owner_email, request.input)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Edit an archived record
pub async fn update_history_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
    Json(request): Json<ManualRecordRequest>,
) -> AppResult<impl IntoResponse> {
    let service = HistoryService::new(state.store.clone());
    let record = service.update_manual(&record_id, request.input).await?;
    Ok(Json(record))
}

/// Batch counts per processing method, for the history report chart
pub async fn history_method_stats(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> AppResult<impl IntoResponse> {
    let owner = query.checked()?;
    let service = HistoryService::new(state.store.clone());
    let stats = service.method_stats(&owner).await?;
    Ok(Json(stats))
}
