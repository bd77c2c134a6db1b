//! Production history service
//!
//! Read side of the archive plus manual record entry: operators can
//! backfill completed batches that were never tracked, and correct an
//! archived record through an explicit edit.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::store::{Collection, DocumentStore, FieldUpdates};
use shared::{
    normalize_group_name, validate_email, validate_harvest_quantity, BatchInput, BatchOutput,
    DryingEquipment, HistoricalBatch, ProcessingMethod, RecordSource, SkyCondition, Stage,
    StageLog,
};

/// History service for archived production records
#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn DocumentStore>,
}

/// Start and end of one stage, as entered on the manual form
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StageWindow {
    pub stage: Stage,
    pub started: NaiveDate,
    pub completed: NaiveDate,
}

/// Input for recording (or correcting) a completed batch by hand
#[derive(Debug, Deserialize)]
pub struct ManualRecordInput {
    #[serde(default)]
    pub group_name: Option<String>,
    pub quantity_kg: Decimal,
    pub method: ProcessingMethod,
    #[serde(default)]
    pub equipment: DryingEquipment,
    #[serde(default)]
    pub weather: Option<SkyCondition>,
    /// Actual yield in kilograms
    pub manual_output_kg: Decimal,
    /// One window per pipeline stage, in any order
    pub stages: Vec<StageWindow>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Batch counts per processing method, for the history report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodFrequency {
    pub fullwash: usize,
    pub honey: usize,
    pub natural: usize,
}

impl HistoryService {
    /// Create a new HistoryService instance
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All archived records for an owner, newest first
    pub async fn list_history(&self, owner_email: &str) -> AppResult<Vec<HistoricalBatch>> {
        let documents = self
            .store
            .list_by_owner(Collection::HistoricalBatches, owner_email)
            .await?;
        documents.into_iter().map(decode_record).collect()
    }

    /// Point lookup of an archived record
    pub async fn get_record(&self, record_id: &str) -> AppResult<HistoricalBatch> {
        let document = self
            .store
            .get(Collection::HistoricalBatches, record_id)
            .await?;
        decode_record(document)
    }

    /// Record a completed batch directly into history
    pub async fn record_manual(
        &self,
        owner_email: &str,
        input: ManualRecordInput,
    ) -> AppResult<HistoricalBatch> {
        validate_email(owner_email).map_err(|msg| AppError::Validation {
            field: "owner_email".to_string(),
            message: msg.to_string(),
            message_id: "Alamat email tidak valid".to_string(),
        })?;

        let mut record = build_manual_record(owner_email, Utc::now(), input)?;
        let document = serde_json::to_value(&record)
            .map_err(|e| AppError::Internal(format!("failed to serialize record: {}", e)))?;
        record.id = self
            .store
            .create(Collection::HistoricalBatches, document)
            .await?;

        tracing::info!(record_id = %record.id, "manual history record saved");
        Ok(record)
    }

    /// Explicit edit of an archived record; the only mutation history
    /// permits. Owner and creation timestamp are preserved.
    pub async fn update_manual(
        &self,
        record_id: &str,
        input: ManualRecordInput,
    ) -> AppResult<HistoricalBatch> {
        let existing = self.get_record(record_id).await?;
        let mut record = build_manual_record(&existing.owner_email, existing.created_at, input)?;
        record.id = record_id.to_string();
        record.source = existing.source;

        let updates = FieldUpdates::new()
            .set("input", to_value(&record.input)?)
            .set("stage_log", to_value(&record.stage_log)?)
            .set("output", to_value(&record.output)?)
            .set(
                "notes",
                record
                    .notes
                    .as_deref()
                    .map(Value::from)
                    .unwrap_or(Value::Null),
            );
        self.store
            .update(Collection::HistoricalBatches, record_id, updates)
            .await?;

        tracing::info!(record_id = %record_id, "history record updated");
        Ok(record)
    }

    /// Batch counts per processing method across an owner's history
    pub async fn method_stats(&self, owner_email: &str) -> AppResult<MethodFrequency> {
        let records = self.list_history(owner_email).await?;
        let mut stats = MethodFrequency::default();
        for record in &records {
            match record.input.method {
                ProcessingMethod::Fullwash => stats.fullwash += 1,
                ProcessingMethod::Honey => stats.honey += 1,
                ProcessingMethod::Natural => stats.natural += 1,
            }
        }
        Ok(stats)
    }
}

fn build_manual_record(
    owner_email: &str,
    created_at: chrono::DateTime<Utc>,
    input: ManualRecordInput,
) -> AppResult<HistoricalBatch> {
    validate_harvest_quantity(input.quantity_kg).map_err(|msg| AppError::Validation {
        field: "quantity_kg".to_string(),
        message: msg.to_string(),
        message_id: "Jumlah panen harus lebih dari nol".to_string(),
    })?;

    if input.manual_output_kg < Decimal::ZERO {
        return Err(AppError::Validation {
            field: "manual_output_kg".to_string(),
            message: "Actual yield cannot be negative".to_string(),
            message_id: "Hasil bubuk tidak boleh negatif".to_string(),
        });
    }

    let stage_log = stage_log_from_windows(&input.stages)?;
    let completion_date = stage_log
        .completed(Stage::Packing)
        .ok_or_else(|| AppError::Internal("stage log lost the packing window".to_string()))?;

    Ok(HistoricalBatch {
        id: String::new(),
        owner_email: owner_email.to_string(),
        created_at,
        source: RecordSource::Manual,
        input: BatchInput {
            group_name: normalize_group_name(input.group_name.as_deref()),
            quantity_kg: input.quantity_kg,
            method: input.method,
            equipment: input.equipment,
            weather: input.weather,
            manual_output_kg: Some(input.manual_output_kg),
        },
        stage_log,
        output: BatchOutput { completion_date },
        notes: input
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    })
}

/// Every pipeline stage must appear exactly once, each window must not end
/// before it starts, and the finish date is the packing completion.
fn stage_log_from_windows(windows: &[StageWindow]) -> AppResult<StageLog> {
    let mut log = StageLog::new();
    for window in windows {
        if window.completed < window.started {
            return Err(AppError::Validation {
                field: StageLog::completion_key(window.stage),
                message: format!("{} ends before it starts", window.stage),
                message_id: format!("Tanggal selesai {} mendahului tanggal mulai", window.stage),
            });
        }
        if log.started(window.stage).is_some() {
            return Err(AppError::Validation {
                field: StageLog::start_key(window.stage),
                message: format!("{} appears more than once", window.stage),
                message_id: format!("Tahap {} tercatat lebih dari satu kali", window.stage),
            });
        }
        log.set_started(window.stage, window.started);
        log.set_completed(window.stage, window.completed);
    }

    for stage in Stage::ALL {
        if log.started(stage).is_none() {
            return Err(AppError::Validation {
                field: StageLog::start_key(stage),
                message: format!("{} dates are missing", stage),
                message_id: format!("Tanggal tahap {} belum diisi", stage),
            });
        }
    }

    // packing presence was just checked
    if let Some(finish) = log.completed(Stage::Packing) {
        log.set_finish(finish);
    }
    Ok(log)
}

fn decode_record(document: Value) -> AppResult<HistoricalBatch> {
    serde_json::from_value(document)
        .map_err(|e| AppError::Internal(format!("corrupt history record: {}", e)))
}

fn to_value<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("failed to serialize record: {}", e)))
}
