//! Document store abstraction
//!
//! Persistence is delegated to a remote document service; the core talks
//! to it through this narrow interface. Every operation is an independent
//! network call that can succeed, fail, or be delayed on its own — there
//! is no transaction spanning two calls.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

mod memory;

pub use memory::MemoryStore;

/// Logical collections backing the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    ActiveBatches,
    HistoricalBatches,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::ActiveBatches => "produksi_active",
            Collection::HistoricalBatches => "riwayat_produksi",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored record. Always a JSON object at the top level.
pub type Document = Value;

/// A partial update: dotted field paths mapped to replacement values.
/// A path like `stage_log.sortasi_selesai` rewrites one nested field and
/// leaves its siblings alone.
#[derive(Debug, Clone, Default)]
pub struct FieldUpdates(BTreeMap<String, Value>);

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(path.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Store operation failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Narrow interface to the document service.
///
/// The core performs no retries; surfacing the failure to the caller is
/// the store consumer's whole obligation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a record and return the assigned id. Any `id` field inside
    /// the document is discarded.
    async fn create(&self, collection: Collection, document: Document) -> StoreResult<String>;

    /// Point lookup. The returned document carries its id in an `id`
    /// field.
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Document>;

    /// Apply a partial, nested-key merge to one record.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        updates: FieldUpdates,
    ) -> StoreResult<()>;

    /// Remove one record.
    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()>;

    /// All records for an owner, newest first by `created_at`.
    async fn list_by_owner(
        &self,
        collection: Collection,
        owner_email: &str,
    ) -> StoreResult<Vec<Document>>;
}
