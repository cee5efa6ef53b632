//! Key-value storage backends
//!
//! Records are flat property maps namespaced by resource type. Every backend
//! implements [`KeyValueStore`]; the rest of the crate only sees the trait.

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use in_memory::InMemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored record: property name to scalar value
pub type Record = Map<String, Value>;

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record stored under this type and id
    #[error("No data found for type={kind} id={id}")]
    Lookup { kind: String, id: String },

    /// Stored data (or data about to be stored) does not have the expected shape
    #[error("Data for {kind}:{id} is corrupted: {message}")]
    Format {
        kind: String,
        id: String,
        message: String,
    },

    /// The backend itself failed (connection, protocol, lock poisoning)
    #[error("{backend} backend error: {message}")]
    Backend { backend: String, message: String },
}

impl StoreError {
    pub fn lookup(kind: &str, id: &str) -> Self {
        StoreError::Lookup {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    pub fn format(kind: &str, id: &str, message: impl Into<String>) -> Self {
        StoreError::Format {
            kind: kind.to_string(),
            id: id.to_string(),
            message: message.into(),
        }
    }

    pub fn backend(backend: &str, message: impl ToString) -> Self {
        StoreError::Backend {
            backend: backend.to_string(),
            message: message.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Type-namespaced key-value store
///
/// Implementations are agnostic to the resource types stored in them; the
/// `kind` argument is an opaque namespace.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Ids of every record of a type
    async fn list(&self, kind: &str) -> StoreResult<Vec<String>>;

    /// Whether a record exists
    async fn exists(&self, kind: &str, id: &str) -> StoreResult<bool>;

    /// Fetch a record, failing with [`StoreError::Lookup`] when absent
    async fn get(&self, kind: &str, id: &str) -> StoreResult<Record>;

    /// Store a record under a freshly generated id and return the id
    async fn add(&self, kind: &str, record: Record) -> StoreResult<String> {
        let id = new_record_id();
        self.set(kind, &id, record).await?;
        Ok(id)
    }

    /// Overwrite (or create) the record stored under an id
    async fn set(&self, kind: &str, id: &str, record: Record) -> StoreResult<()>;

    /// Merge properties into an existing record
    async fn update(&self, kind: &str, id: &str, record: Record) -> StoreResult<()> {
        let mut existing = self.get(kind, id).await?;
        existing.extend(record);
        self.set(kind, id, existing).await
    }

    /// Linear scan for the first record whose property equals `value`
    async fn find(&self, kind: &str, property: &str, value: &Value)
    -> StoreResult<Option<String>>;

    /// Remove a record; removing a missing record is not an error
    async fn delete(&self, kind: &str, id: &str) -> StoreResult<()>;
}

/// Generate a new record id (time-ordered UUID)
pub fn new_record_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Reject records holding nested values
pub fn ensure_flat(kind: &str, id: &str, record: &Record) -> StoreResult<()> {
    match record
        .iter()
        .find(|(_, value)| value.is_array() || value.is_object())
    {
        Some((key, _)) => Err(StoreError::format(
            kind,
            id,
            format!("property '{}' is not a scalar", key),
        )),
        None => Ok(()),
    }
}
