//! Redis-backed key-value store
//!
//! Each record lives under the key `type:id` as a JSON string. Listing and
//! `find` walk `KEYS type:*`, which is fine for the record counts this
//! service handles.

use super::{KeyValueStore, Record, StoreError, StoreResult, ensure_flat};
use ::redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

const BACKEND: &str = "Redis";

/// A `type:id` storage key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub kind: String,
    pub id: String,
}

impl Key {
    pub fn new(kind: &str, id: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    /// Parse a raw key, which must be exactly two non-empty parts
    pub fn parse(raw: &str) -> StoreResult<Self> {
        let mut bits = raw.split(':');
        match (bits.next(), bits.next(), bits.next()) {
            (Some(kind), Some(id), None) if !kind.is_empty() && !id.is_empty() => {
                Ok(Self::new(kind, id))
            }
            _ => Err(StoreError::format("key", raw, format!("Key {} is invalid", raw))),
        }
    }

    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

/// Redis store holding one multiplexed connection
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to the Redis server at `url` (e.g. `redis://127.0.0.1:6379`)
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = Client::open(url).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            StoreError::backend(BACKEND, e)
        })?;

        debug!("Connecting to Redis at {}", url);
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::backend(BACKEND, e))?;
        debug!("Redis connected");

        Ok(Self { conn })
    }

    fn conn(&self) -> MultiplexedConnection {
        self.conn.clone()
    }

    async fn keys(&self, kind: &str) -> StoreResult<Vec<Key>> {
        let pattern = Key::new(kind, "*").key();
        let raw: Vec<String> = self
            .conn()
            .keys(&pattern)
            .await
            .map_err(|e| StoreError::backend(BACKEND, e))?;

        raw.iter().map(|k| Key::parse(k)).collect()
    }
}

fn decode(key: &Key, json: &str) -> StoreResult<Record> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err(StoreError::format(&key.kind, &key.id, "not an object")),
        Err(e) => Err(StoreError::format(&key.kind, &key.id, e.to_string())),
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn list(&self, kind: &str) -> StoreResult<Vec<String>> {
        Ok(self.keys(kind).await?.into_iter().map(|k| k.id).collect())
    }

    async fn exists(&self, kind: &str, id: &str) -> StoreResult<bool> {
        let key = Key::new(kind, id);
        self.conn()
            .exists(key.key())
            .await
            .map_err(|e| StoreError::backend(BACKEND, e))
    }

    async fn get(&self, kind: &str, id: &str) -> StoreResult<Record> {
        let key = Key::new(kind, id);
        let json: Option<String> = self
            .conn()
            .get(key.key())
            .await
            .map_err(|e| StoreError::backend(BACKEND, e))?;

        match json {
            Some(json) => decode(&key, &json),
            None => Err(StoreError::lookup(kind, id)),
        }
    }

    async fn set(&self, kind: &str, id: &str, record: Record) -> StoreResult<()> {
        ensure_flat(kind, id, &record)?;

        let key = Key::new(kind, id);
        let json = Value::Object(record).to_string();
        self.conn()
            .set::<_, _, ()>(key.key(), json)
            .await
            .map_err(|e| {
                error!("Redis error while setting key \"{}\": {}", key.key(), e);
                StoreError::backend(BACKEND, e)
            })
    }

    async fn find(
        &self,
        kind: &str,
        property: &str,
        value: &Value,
    ) -> StoreResult<Option<String>> {
        for key in self.keys(kind).await? {
            // Records can vanish between KEYS and GET
            let record = match self.get(&key.kind, &key.id).await {
                Ok(record) => record,
                Err(StoreError::Lookup { .. }) => continue,
                Err(e) => return Err(e),
            };
            if record.get(property) == Some(value) {
                return Ok(Some(key.id));
            }
        }
        Ok(None)
    }

    async fn delete(&self, kind: &str, id: &str) -> StoreResult<()> {
        let key = Key::new(kind, id);
        self.conn()
            .del::<_, ()>(key.key())
            .await
            .map_err(|e| StoreError::backend(BACKEND, e))
    }
}
