//! `GET /api/time`: the server clock

use super::registry::ResourceDescriptor;
use axum::{Json, Router, routing::get};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};

pub const KIND: &str = "time";

pub struct TimeDescriptor;

impl ResourceDescriptor for TimeDescriptor {
    fn kind(&self) -> &str {
        KIND
    }

    fn build_routes(&self) -> Router {
        Router::new().route(&format!("/api/{}", KIND), get(current_time))
    }
}

/// Current time as RFC 3339 in UTC, millisecond precision
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn current_time() -> Json<Value> {
    Json(json!({
        "url": format!("/api/{}", KIND),
        "time": now(),
    }))
}
