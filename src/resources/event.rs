//! Calendar events
//!
//! Dates are whole days. Input may be `YYYY-MM-DD` or a full RFC 3339
//! timestamp, in which case only its UTC date is kept.

use crate::core::error::{ApiResult, ResourceError};
use crate::core::resource::{Resource, ResourceFactory, required_str, stored_str};
use crate::storage::{KeyValueStore, Record, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

pub const KIND: &str = "event";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub struct EventFactory {
    store: Arc<dyn KeyValueStore>,
}

impl EventFactory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

/// Parse a wire date
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn required_date(input: &Value, field: &str) -> ApiResult<NaiveDate> {
    let raw = required_str(KIND, input, field)?;
    parse_date(raw).ok_or_else(|| {
        ResourceError::invalid(KIND, field, format!("'{}' is not a valid date", raw)).into()
    })
}

fn stored_date(id: &str, record: &Record, field: &str) -> StoreResult<NaiveDate> {
    let raw = stored_str(KIND, id, record, field)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| StoreError::format(KIND, id, format!("bad date in '{}': {}", field, e)))
}

#[async_trait]
impl ResourceFactory for EventFactory {
    type Content = Event;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn new_content(&self, input: &Value) -> ApiResult<Event> {
        Ok(Event {
            name: required_str(KIND, input, "name")?.to_string(),
            start_date: required_date(input, "startDate")?,
            end_date: required_date(input, "endDate")?,
        })
    }

    fn from_data(&self, id: &str, record: &Record) -> StoreResult<Event> {
        Ok(Event {
            name: stored_str(KIND, id, record, "name")?,
            start_date: stored_date(id, record, "startDate")?,
            end_date: stored_date(id, record, "endDate")?,
        })
    }

    fn to_data(&self, content: &Event) -> Record {
        let mut record = Record::new();
        record.insert("name".to_string(), json!(content.name));
        record.insert("startDate".to_string(), json!(format_date(&content.start_date)));
        record.insert("endDate".to_string(), json!(format_date(&content.end_date)));
        record
    }

    fn to_rest(&self, resource: &Resource<Event>) -> Value {
        json!({
            "id": resource.id,
            "url": self.make_url(&[&resource.id]),
            "name": resource.content.name,
            "startDate": format_date(&resource.content.start_date),
            "endDate": format_date(&resource.content.end_date),
        })
    }
}
