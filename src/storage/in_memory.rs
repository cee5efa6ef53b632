//! In-memory key-value store for testing and development

use super::{KeyValueStore, Record, StoreError, StoreResult, ensure_flat};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Arc, RwLock};

type Namespace = IndexMap<String, Record>;

/// In-memory store implementation
///
/// Uses RwLock for thread-safe access. Records keep insertion order, so
/// `find` returns the earliest inserted match.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<IndexMap<String, Namespace>>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(e: impl std::fmt::Display) -> StoreError {
    StoreError::backend("in-memory", format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn list(&self, kind: &str) -> StoreResult<Vec<String>> {
        let data = self.data.read().map_err(poisoned)?;

        Ok(data
            .get(kind)
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn exists(&self, kind: &str, id: &str) -> StoreResult<bool> {
        let data = self.data.read().map_err(poisoned)?;

        Ok(data.get(kind).is_some_and(|records| records.contains_key(id)))
    }

    async fn get(&self, kind: &str, id: &str) -> StoreResult<Record> {
        let data = self.data.read().map_err(poisoned)?;

        data.get(kind)
            .and_then(|records| records.get(id))
            .cloned()
            .ok_or_else(|| StoreError::lookup(kind, id))
    }

    async fn set(&self, kind: &str, id: &str, record: Record) -> StoreResult<()> {
        ensure_flat(kind, id, &record)?;

        let mut data = self.data.write().map_err(poisoned)?;

        data.entry(kind.to_string())
            .or_default()
            .insert(id.to_string(), record);

        Ok(())
    }

    async fn update(&self, kind: &str, id: &str, record: Record) -> StoreResult<()> {
        ensure_flat(kind, id, &record)?;

        let mut data = self.data.write().map_err(poisoned)?;

        let existing = data
            .get_mut(kind)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::lookup(kind, id))?;
        existing.extend(record);

        Ok(())
    }

    async fn find(
        &self,
        kind: &str,
        property: &str,
        value: &Value,
    ) -> StoreResult<Option<String>> {
        let data = self.data.read().map_err(poisoned)?;

        Ok(data.get(kind).and_then(|records| {
            records
                .iter()
                .find(|(_, record)| record.get(property) == Some(value))
                .map(|(id, _)| id.clone())
        }))
    }

    async fn delete(&self, kind: &str, id: &str) -> StoreResult<()> {
        let mut data = self.data.write().map_err(poisoned)?;

        if let Some(records) = data.get_mut(kind) {
            records.shift_remove(id);
        }

        Ok(())
    }
}
