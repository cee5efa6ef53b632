//! Shared test harness for key-value store backends
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! store_tests!(InMemoryStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod store_tests;

use almanac::storage::Record;
use serde_json::{Value, json};

/// A type namespace no other test touches, so tests can share one backend
pub fn unique_kind() -> String {
    format!("section_{}", uuid::Uuid::now_v7().simple())
}

/// Build a record from a JSON object literal
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

pub fn original() -> Record {
    record(json!({"name": "value", "description": "description"}))
}

pub fn overwritten() -> Record {
    record(json!({"name": "newValue", "altName": "value"}))
}

pub fn overwritten_and_updated() -> Record {
    record(json!({"name": "newValue", "altName": "value", "added": "newValue"}))
}
