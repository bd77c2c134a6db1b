//! Batch tracking models
//!
//! A `Batch` lives in the active collection while it moves through the
//! pipeline; archival turns it into a `HistoricalBatch` in the history
//! collection. A batch id is in exactly one of the two at any time.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{default_group_name, DryingEquipment, ProcessingMethod, SkyCondition, Stage};

/// Harvest parameters snapshotted onto a batch at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchInput {
    #[serde(default = "default_group_name")]
    pub group_name: String,
    pub quantity_kg: Decimal,
    pub method: ProcessingMethod,
    #[serde(default)]
    pub equipment: DryingEquipment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<SkyCondition>,
    /// Actual yield in kilograms, entered by the operator at archival
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_output_kg: Option<Decimal>,
}

/// Per-stage dates and notes, keyed `{stage}_mulai` / `{stage}_selesai` /
/// `{stage}_catatan`, plus a `finish` key set at archival. Keys accumulate;
/// a transition only adds keys for the stage being closed and the one being
/// opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageLog(BTreeMap<String, String>);

impl StageLog {
    pub const FINISH_KEY: &'static str = "finish";

    pub fn new() -> Self {
        Self::default()
    }

    /// Log for a freshly created batch: only the first stage has started
    pub fn opened(stage: Stage, date: NaiveDate) -> Self {
        let mut log = Self::new();
        log.set_started(stage, date);
        log
    }

    pub fn start_key(stage: Stage) -> String {
        format!("{}_mulai", stage.as_str())
    }

    pub fn completion_key(stage: Stage) -> String {
        format!("{}_selesai", stage.as_str())
    }

    pub fn note_key(stage: Stage) -> String {
        format!("{}_catatan", stage.as_str())
    }

    pub fn started(&self, stage: Stage) -> Option<NaiveDate> {
        self.date(&Self::start_key(stage))
    }

    pub fn completed(&self, stage: Stage) -> Option<NaiveDate> {
        self.date(&Self::completion_key(stage))
    }

    pub fn note(&self, stage: Stage) -> Option<&str> {
        self.0.get(&Self::note_key(stage)).map(String::as_str)
    }

    pub fn finish(&self) -> Option<NaiveDate> {
        self.date(Self::FINISH_KEY)
    }

    pub fn set_started(&mut self, stage: Stage, date: NaiveDate) {
        self.0.insert(Self::start_key(stage), date.to_string());
    }

    pub fn set_completed(&mut self, stage: Stage, date: NaiveDate) {
        self.0.insert(Self::completion_key(stage), date.to_string());
    }

    pub fn set_note(&mut self, stage: Stage, note: &str) {
        self.0.insert(Self::note_key(stage), note.to_string());
    }

    pub fn set_finish(&mut self, date: NaiveDate) {
        self.0.insert(Self::FINISH_KEY.to_string(), date.to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn date(&self, key: &str) -> Option<NaiveDate> {
        self.0.get(key).and_then(|v| v.parse().ok())
    }
}

/// A batch in active tracking. `status` is always a pipeline stage; the
/// finished state is represented by absence from the active collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Store-assigned identifier; empty until the record is persisted
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    pub status: Stage,
    pub input: BatchInput,
    #[serde(default)]
    pub stage_log: StageLog,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Batch {
    /// Terminal transformation applied at archival: closes the final stage,
    /// stamps the finish date, records the actual yield, and appends the
    /// closing note. The id is dropped; the history collection assigns its
    /// own.
    pub fn into_archived(
        mut self,
        completion_date: NaiveDate,
        final_output_kg: Decimal,
        note: Option<&str>,
    ) -> HistoricalBatch {
        self.stage_log.set_completed(self.status, completion_date);
        self.stage_log.set_finish(completion_date);
        if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
            self.stage_log.set_note(self.status, note);
        }
        HistoricalBatch {
            id: String::new(),
            owner_email: self.owner_email,
            created_at: self.created_at,
            source: RecordSource::Tracked,
            input: BatchInput {
                manual_output_kg: Some(final_output_kg),
                ..self.input
            },
            stage_log: self.stage_log,
            output: BatchOutput { completion_date },
            notes: append_note(self.notes, note),
        }
    }
}

/// Where a history record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    /// Archived out of active tracking
    #[default]
    Tracked,
    /// Entered directly by the operator after the fact
    Manual,
}

/// Final figures recorded at archival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutput {
    pub completion_date: NaiveDate,
}

/// The terminal form of a batch, immutable except through explicit manual
/// edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBatch {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub source: RecordSource,
    pub input: BatchInput,
    #[serde(default)]
    pub stage_log: StageLog,
    pub output: BatchOutput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Notes accumulate across updates; later entries go on a new line
pub fn append_note(existing: Option<String>, addition: Option<&str>) -> Option<String> {
    let addition = addition.map(str::trim).filter(|n| !n.is_empty());
    match (existing, addition) {
        (Some(prev), Some(new)) => Some(format!("{}\n{}", prev, new)),
        (Some(prev), None) => Some(prev),
        (None, Some(new)) => Some(new.to_string()),
        (None, None) => None,
    }
}
