//! Batch lifecycle integration tests
//!
//! Exercises the stage state machine end to end over the in-memory store:
//! creation, in-place transitions, the archive transaction, and its
//! failure modes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use kopi_backend::error::AppError;
use kopi_backend::services::batch::{
    AdvanceBatchInput, AdvanceOutcome, BatchService, CreateBatchInput,
};
use kopi_backend::store::{
    Collection, Document, DocumentStore, FieldUpdates, MemoryStore, StoreError, StoreResult,
};
use shared::{DryingEquipment, ProcessingMethod, Stage};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

fn create_input() -> CreateBatchInput {
    CreateBatchInput {
        group_name: Some("Tani Maju".to_string()),
        quantity_kg: Decimal::from(80),
        method: ProcessingMethod::Honey,
        equipment: DryingEquipment::Manual,
        weather: None,
        start_date: date(1),
        note: Some("panen pagi".to_string()),
    }
}

fn advance_input(day: u32) -> AdvanceBatchInput {
    AdvanceBatchInput {
        completion_date: date(day),
        note: None,
        final_output_kg: None,
    }
}

const OWNER: &str = "kelompok@nglurah.id";

#[tokio::test]
async fn test_create_starts_in_sorting() {
    let store = Arc::new(MemoryStore::new());
    let service = BatchService::new(store.clone());

    let batch = service.create_batch(OWNER, create_input()).await.unwrap();

    assert!(!batch.id.is_empty());
    assert_eq!(batch.status, Stage::Sorting);
    assert_eq!(batch.stage_log.started(Stage::Sorting), Some(date(1)));
    assert_eq!(batch.stage_log.note(Stage::Sorting), Some("panen pagi"));
    assert_eq!(batch.input.group_name, "Tani Maju");
    assert!(batch.input.manual_output_kg.is_none());

    // The record lives in the active collection
    let stored = store
        .get(Collection::ActiveBatches, &batch.id)
        .await
        .unwrap();
    assert_eq!(stored["status"], "sortasi");
}

#[tokio::test]
async fn test_create_rejects_bad_owner_and_quantity() {
    let service = BatchService::new(Arc::new(MemoryStore::new()));

    let err = service
        .create_batch("not-an-email", create_input())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let mut input = create_input();
    input.quantity_kg = Decimal::ZERO;
    let err = service.create_batch(OWNER, input).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

#[tokio::test]
async fn test_advance_stamps_both_sides_of_the_boundary() {
    let store = Arc::new(MemoryStore::new());
    let service = BatchService::new(store.clone());
    let batch = service.create_batch(OWNER, create_input()).await.unwrap();

    let outcome = service.advance(&batch.id, advance_input(2)).await.unwrap();
    let advanced = match outcome {
        AdvanceOutcome::Advanced { batch } => batch,
        AdvanceOutcome::Archived { .. } => panic!("first advance must not archive"),
    };

    assert_eq!(advanced.status, Stage::Fermentation);
    assert_eq!(advanced.stage_log.completed(Stage::Sorting), Some(date(2)));
    // The next stage starts the same day the previous one finishes
    assert_eq!(advanced.stage_log.started(Stage::Fermentation), Some(date(2)));

    // And the stored record says the same
    let stored = service.get_batch(&batch.id).await.unwrap();
    assert_eq!(stored, advanced);
}

#[tokio::test]
async fn test_advance_preserves_earlier_stage_log_keys() {
    let store = Arc::new(MemoryStore::new());
    let service = BatchService::new(store.clone());
    let batch = service.create_batch(OWNER, create_input()).await.unwrap();

    let first = AdvanceBatchInput {
        completion_date: date(2),
        note: Some("biji seragam".to_string()),
        final_output_kg: None,
    };
    service.advance(&batch.id, first).await.unwrap();
    service.advance(&batch.id, advance_input(4)).await.unwrap();

    let stored = service.get_batch(&batch.id).await.unwrap();
    assert_eq!(stored.status, Stage::Drying);
    // Keys written for earlier stages are untouched by later transitions
    assert_eq!(stored.stage_log.started(Stage::Sorting), Some(date(1)));
    assert_eq!(stored.stage_log.note(Stage::Sorting), Some("biji seragam"));
    assert_eq!(stored.stage_log.completed(Stage::Sorting), Some(date(2)));
    assert_eq!(stored.stage_log.started(Stage::Fermentation), Some(date(2)));
    assert_eq!(stored.stage_log.completed(Stage::Fermentation), Some(date(4)));
    assert_eq!(stored.stage_log.started(Stage::Drying), Some(date(4)));
}

#[tokio::test]
async fn test_completion_date_before_stage_start_is_rejected() {
    let service = BatchService::new(Arc::new(MemoryStore::new()));
    let batch = service
        .create_batch(
            OWNER,
            CreateBatchInput {
                start_date: date(10),
                ..create_input()
            },
        )
        .await
        .unwrap();

    let err = service.advance(&batch.id, advance_input(9)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    // The batch did not move
    let stored = service.get_batch(&batch.id).await.unwrap();
    assert_eq!(stored.status, Stage::Sorting);
}

#[tokio::test]
async fn test_full_pipeline_ends_in_history_not_active() {
    let store = Arc::new(MemoryStore::new());
    let service = BatchService::new(store.clone());
    let batch = service.create_batch(OWNER, create_input()).await.unwrap();

    // Four in-place transitions: sortasi → fermentasi → jemur → roasting →
    // kemas
    for day in [2, 4, 20, 24] {
        let outcome = service.advance(&batch.id, advance_input(day)).await.unwrap();
        let advanced = match outcome {
            AdvanceOutcome::Advanced { batch } => batch,
            AdvanceOutcome::Archived { .. } => panic!("pipeline archived early"),
        };
        // An active batch always shows a pipeline stage, never a terminal
        // marker
        let stored = store
            .get(Collection::ActiveBatches, &advanced.id)
            .await
            .unwrap();
        assert!(Stage::from_str(stored["status"].as_str().unwrap()).is_some());
    }

    // The fifth advance closes kemas and archives
    let outcome = service
        .advance(
            &batch.id,
            AdvanceBatchInput {
                completion_date: date(25),
                note: Some("siap kirim".to_string()),
                final_output_kg: Some(Decimal::from(14)),
            },
        )
        .await
        .unwrap();
    let record = match outcome {
        AdvanceOutcome::Archived { record } => record,
        AdvanceOutcome::Advanced { .. } => panic!("final advance must archive"),
    };

    // Gone from active, present in history
    assert!(matches!(
        service.get_batch(&batch.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(service.list_active(OWNER).await.unwrap().is_empty());

    let history = store
        .list_by_owner(Collection::HistoricalBatches, OWNER)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"].as_str().unwrap(), record.id);

    assert_eq!(record.stage_log.finish(), Some(date(25)));
    assert_eq!(record.stage_log.completed(Stage::Packing), Some(date(25)));
    assert_eq!(record.input.manual_output_kg, Some(Decimal::from(14)));
    assert_eq!(record.output.completion_date, date(25));
    assert_eq!(record.notes.as_deref(), Some("siap kirim"));
    // The whole trail survived the move
    assert_eq!(record.stage_log.started(Stage::Sorting), Some(date(1)));
    assert_eq!(record.stage_log.completed(Stage::Roasting), Some(date(24)));
}

#[tokio::test]
async fn test_archive_without_final_output_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let service = BatchService::new(store.clone());
    let batch = service.create_batch(OWNER, create_input()).await.unwrap();

    for day in [2, 4, 20, 24] {
        service.advance(&batch.id, advance_input(day)).await.unwrap();
    }

    let err = service.advance(&batch.id, advance_input(25)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "final_output_kg"));

    // Nothing moved: still active, still in kemas, history empty
    let stored = service.get_batch(&batch.id).await.unwrap();
    assert_eq!(stored.status, Stage::Packing);
    assert!(store
        .list_by_owner(Collection::HistoricalBatches, OWNER)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_lookup_of_unknown_batch_is_not_found() {
    let service = BatchService::new(Arc::new(MemoryStore::new()));

    assert!(matches!(
        service.get_batch("no-such-batch").await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        service
            .advance("no-such-batch", advance_input(2))
            .await
            .unwrap_err(),
        AppError::NotFound(_)
    ));
    // An empty list for an unknown owner is a valid result, not an error
    assert!(service.list_active("nobody@nglurah.id").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_active_is_newest_first() {
    let service = BatchService::new(Arc::new(MemoryStore::new()));

    let older = service.create_batch(OWNER, create_input()).await.unwrap();
    let newer = service
        .create_batch(
            OWNER,
            CreateBatchInput {
                group_name: Some("Sido Makmur".to_string()),
                ..create_input()
            },
        )
        .await
        .unwrap();

    let listed = service.list_active(OWNER).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, newer.id);
    assert_eq!(listed[1].id, older.id);
}

// ============================================================================
// Archive failure modes
// ============================================================================

/// Store wrapper whose deletes can be switched off, standing in for the
/// remote service failing between the two steps of the archive
/// transaction.
struct FailingDeleteStore {
    inner: MemoryStore,
    fail_deletes: AtomicBool,
}

impl FailingDeleteStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_deletes: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl DocumentStore for FailingDeleteStore {
    async fn create(&self, collection: Collection, document: Document) -> StoreResult<String> {
        self.inner.create(collection, document).await
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Document> {
        self.inner.get(collection, id).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        updates: FieldUpdates,
    ) -> StoreResult<()> {
        self.inner.update(collection, id, updates).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        self.inner.delete(collection, id).await
    }

    async fn list_by_owner(
        &self,
        collection: Collection,
        owner_email: &str,
    ) -> StoreResult<Vec<Document>> {
        self.inner.list_by_owner(collection, owner_email).await
    }
}

#[tokio::test]
async fn test_failed_delete_after_history_write_is_distinguished() {
    let store = Arc::new(FailingDeleteStore::new());
    let service = BatchService::new(store.clone());
    let batch = service.create_batch(OWNER, create_input()).await.unwrap();

    for day in [2, 4, 20, 24] {
        service.advance(&batch.id, advance_input(day)).await.unwrap();
    }

    store.fail_deletes.store(true, Ordering::SeqCst);
    let err = service
        .advance(
            &batch.id,
            AdvanceBatchInput {
                completion_date: date(25),
                note: None,
                final_output_kg: Some(Decimal::from(14)),
            },
        )
        .await
        .unwrap_err();

    let history_id = match err {
        AppError::ArchiveIncomplete {
            ref batch_id,
            ref history_id,
            ..
        } => {
            assert_eq!(batch_id, &batch.id);
            history_id.clone()
        }
        other => panic!("expected ArchiveIncomplete, got {:?}", other),
    };

    // The batch is now duplicated: history holds the archived record while
    // the active copy is still there for the caller to reconcile
    assert!(store
        .get(Collection::HistoricalBatches, &history_id)
        .await
        .is_ok());
    assert_eq!(
        service.get_batch(&batch.id).await.unwrap().status,
        Stage::Packing
    );
}
