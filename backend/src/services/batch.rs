//! Batch lifecycle service
//!
//! Owns the stage state machine: creates batches, applies stage
//! transitions, and runs the archive transaction that moves a finished
//! batch out of active tracking and into history.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::store::{Collection, DocumentStore, FieldUpdates};
use shared::{
    normalize_group_name, validate_email, validate_harvest_quantity, validate_stage_completion,
    Batch, BatchInput, DryingEquipment, HistoricalBatch, NextStep, ProcessingMethod, SkyCondition,
    Stage, StageLog,
};

/// Batch lifecycle service
#[derive(Clone)]
pub struct BatchService {
    store: Arc<dyn DocumentStore>,
}

/// Input for starting a new batch
#[derive(Debug, Deserialize)]
pub struct CreateBatchInput {
    #[serde(default)]
    pub group_name: Option<String>,
    pub quantity_kg: Decimal,
    pub method: ProcessingMethod,
    #[serde(default)]
    pub equipment: DryingEquipment,
    #[serde(default)]
    pub weather: Option<SkyCondition>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

/// Input for advancing a batch one stage
#[derive(Debug, Deserialize)]
pub struct AdvanceBatchInput {
    /// Completion date of the current stage; the next stage starts the
    /// same day
    pub completion_date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
    /// Actual yield in kilograms; required when the advance archives the
    /// batch, ignored otherwise
    #[serde(default)]
    pub final_output_kg: Option<Decimal>,
}

/// What an advance did
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdvanceOutcome {
    /// The batch moved to the next stage and stays in active tracking
    Advanced { batch: Batch },
    /// The batch finished the pipeline and now lives in history
    Archived { record: HistoricalBatch },
}

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Start a new batch in the first pipeline stage
    pub async fn create_batch(
        &self,
        owner_email: &str,
        input: CreateBatchInput,
    ) -> AppResult<Batch> {
        validate_email(owner_email).map_err(|msg| AppError::Validation {
            field: "owner_email".to_string(),
            message: msg.to_string(),
            message_id: "Alamat email tidak valid".to_string(),
        })?;

        validate_harvest_quantity(input.quantity_kg).map_err(|msg| AppError::Validation {
            field: "quantity_kg".to_string(),
            message: msg.to_string(),
            message_id: "Jumlah panen harus lebih dari nol".to_string(),
        })?;

        let mut stage_log = StageLog::opened(Stage::Sorting, input.start_date);
        if let Some(note) = input.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            stage_log.set_note(Stage::Sorting, note);
        }

        let mut batch = Batch {
            id: String::new(),
            owner_email: owner_email.to_string(),
            created_at: Utc::now(),
            status: Stage::Sorting,
            input: BatchInput {
                group_name: normalize_group_name(input.group_name.as_deref()),
                quantity_kg: input.quantity_kg,
                method: input.method,
                equipment: input.equipment,
                weather: input.weather,
                manual_output_kg: None,
            },
            stage_log,
            notes: None,
        };

        let document = serde_json::to_value(&batch)
            .map_err(|e| AppError::Internal(format!("failed to serialize batch: {}", e)))?;
        batch.id = self
            .store
            .create(Collection::ActiveBatches, document)
            .await?;

        tracing::info!(batch_id = %batch.id, group = %batch.input.group_name, "batch created");
        Ok(batch)
    }

    /// All active batches for an owner, newest first. An empty list is a
    /// valid result, not an error.
    pub async fn list_active(&self, owner_email: &str) -> AppResult<Vec<Batch>> {
        let documents = self
            .store
            .list_by_owner(Collection::ActiveBatches, owner_email)
            .await?;
        documents.into_iter().map(decode_batch).collect()
    }

    /// Point lookup of an active batch
    pub async fn get_batch(&self, batch_id: &str) -> AppResult<Batch> {
        let document = self.store.get(Collection::ActiveBatches, batch_id).await?;
        decode_batch(document)
    }

    /// Close the current stage and open the next one, or archive the
    /// batch when the pipeline is done.
    ///
    /// Two concurrent advances on the same batch can both read the same
    /// pre-transition status; the last store write wins, and on the
    /// archive path the history collection can end up with a duplicate
    /// record. Accepted for the single-operator usage pattern.
    pub async fn advance(
        &self,
        batch_id: &str,
        input: AdvanceBatchInput,
    ) -> AppResult<AdvanceOutcome> {
        let batch = self.get_batch(batch_id).await?;

        validate_stage_completion(&batch.stage_log, batch.status, input.completion_date).map_err(
            |msg| AppError::Validation {
                field: "completion_date".to_string(),
                message: msg.to_string(),
                message_id: "Tanggal selesai mendahului tanggal mulai tahap".to_string(),
            },
        )?;

        match batch.status.next_step() {
            NextStep::Advance(next_stage) => {
                self.advance_in_place(batch, next_stage, input).await
            }
            NextStep::Archive => self.archive(batch, input).await,
        }
    }

    /// In-place transition: a partial update touching only the stage
    /// boundary being crossed. Earlier stage-log keys stay untouched.
    async fn advance_in_place(
        &self,
        batch: Batch,
        next_stage: Stage,
        input: AdvanceBatchInput,
    ) -> AppResult<AdvanceOutcome> {
        let completion = input.completion_date.to_string();
        let mut updates = FieldUpdates::new()
            .set("status", next_stage.as_str())
            .set(
                format!("stage_log.{}", StageLog::completion_key(batch.status)),
                completion.clone(),
            )
            .set(
                format!("stage_log.{}", StageLog::start_key(next_stage)),
                completion,
            );

        let note = input.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
        if let Some(note) = note {
            updates = updates.set(
                format!("stage_log.{}", StageLog::note_key(batch.status)),
                note,
            );
        }

        self.store
            .update(Collection::ActiveBatches, &batch.id, updates)
            .await?;

        // Mirror the stored transition on the in-memory copy
        let mut advanced = batch;
        advanced
            .stage_log
            .set_completed(advanced.status, input.completion_date);
        advanced.stage_log.set_started(next_stage, input.completion_date);
        if let Some(note) = note {
            advanced.stage_log.set_note(advanced.status, note);
        }
        advanced.status = next_stage;

        tracing::info!(batch_id = %advanced.id, stage = %next_stage, "batch advanced");
        Ok(AdvanceOutcome::Advanced { batch: advanced })
    }

    /// Terminal transition: write the finished record to history, then
    /// delete the active batch. The two store calls are not atomic; a
    /// delete failure after a successful write surfaces as
    /// `ArchiveIncomplete` so the caller can reconcile.
    async fn archive(&self, batch: Batch, input: AdvanceBatchInput) -> AppResult<AdvanceOutcome> {
        let final_output_kg = input.final_output_kg.ok_or_else(|| AppError::Validation {
            field: "final_output_kg".to_string(),
            message: "Actual yield is required to archive a batch".to_string(),
            message_id: "Hasil bubuk wajib diisi untuk mengarsipkan batch".to_string(),
        })?;
        if final_output_kg < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "final_output_kg".to_string(),
                message: "Actual yield cannot be negative".to_string(),
                message_id: "Hasil bubuk tidak boleh negatif".to_string(),
            });
        }

        let batch_id = batch.id.clone();
        let mut record = batch.into_archived(
            input.completion_date,
            final_output_kg,
            input.note.as_deref(),
        );

        let document = serde_json::to_value(&record)
            .map_err(|e| AppError::Internal(format!("failed to serialize archive: {}", e)))?;
        let history_id = self
            .store
            .create(Collection::HistoricalBatches, document)
            .await?;
        record.id = history_id.clone();

        if let Err(e) = self.store.delete(Collection::ActiveBatches, &batch_id).await {
            return Err(AppError::ArchiveIncomplete {
                batch_id,
                history_id,
                reason: e.to_string(),
            });
        }

        tracing::info!(batch_id = %batch_id, history_id = %history_id, "batch archived");
        Ok(AdvanceOutcome::Archived { record })
    }
}

fn decode_batch(document: Value) -> AppResult<Batch> {
    serde_json::from_value(document)
        .map_err(|e| AppError::Internal(format!("corrupt batch record: {}", e)))
}
