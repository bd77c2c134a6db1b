//! In-memory document store
//!
//! Reference implementation of the store interface, backing the
//! development server and the test suite. Mirrors the remote service's
//! semantics: opaque string ids, dotted-path partial updates, owner
//! queries ordered newest first.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, Document, DocumentStore, FieldUpdates, StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, HashMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: Collection, document: Document) -> StoreResult<String> {
        let mut document = document;
        let object = document
            .as_object_mut()
            .ok_or_else(|| StoreError::InvalidDocument("document root must be an object".into()))?;
        object.remove("id");

        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .insert(id.clone(), document);
        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Document> {
        let collections = self.collections.read().await;
        let document = collections
            .get(&collection)
            .and_then(|records| records.get(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.as_str(),
                id: id.to_string(),
            })?;
        Ok(with_id(document.clone(), id))
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        updates: FieldUpdates,
    ) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.as_str(),
                id: id.to_string(),
            })?;

        for (path, value) in updates.iter() {
            apply_field(document, path, value.clone())?;
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(&collection)
            .and_then(|records| records.remove(id));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                collection: collection.as_str(),
                id: id.to_string(),
            }),
        }
    }

    async fn list_by_owner(
        &self,
        collection: Collection,
        owner_email: &str,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut matches: Vec<(String, Document)> = collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|(_, doc)| {
                        doc.get("owner_email").and_then(Value::as_str) == Some(owner_email)
                    })
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();

        // created_at is RFC 3339, so the lexicographic order is the
        // chronological order
        matches.sort_by(|(_, a), (_, b)| created_at(b).cmp(&created_at(a)));

        Ok(matches
            .into_iter()
            .map(|(id, doc)| with_id(doc, &id))
            .collect())
    }
}

fn created_at(document: &Document) -> String {
    document
        .get("created_at")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn with_id(mut document: Document, id: &str) -> Document {
    if let Some(object) = document.as_object_mut() {
        object.insert("id".to_string(), Value::String(id.to_string()));
    }
    document
}

/// Walk a dotted path, creating intermediate objects, and replace the leaf
fn apply_field(document: &mut Document, path: &str, value: Value) -> StoreResult<()> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let leaf = match segments.pop() {
        Some(leaf) if !leaf.is_empty() => leaf,
        _ => {
            return Err(StoreError::InvalidDocument(format!(
                "invalid field path `{}`",
                path
            )))
        }
    };

    let mut current = document.as_object_mut().ok_or_else(|| {
        StoreError::InvalidDocument("document root must be an object".to_string())
    })?;

    for segment in segments {
        current = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| {
                StoreError::InvalidDocument(format!("field `{}` is not an object", segment))
            })?;
    }

    current.insert(leaf.to_string(), value);
    Ok(())
}
