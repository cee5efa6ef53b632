//! Helpers shared by the HTTP tests

#![allow(dead_code)]

use almanac::server::ServerBuilder;
use almanac::storage::InMemoryStore;
use axum::http::{HeaderName, HeaderValue, header};
use axum_test::TestServer;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Value, json};

/// A server over a fresh in-memory store, without a client directory
pub fn test_server() -> TestServer {
    let app = ServerBuilder::new()
        .with_store(InMemoryStore::new())
        .build()
        .expect("Failed to build app");
    TestServer::new(app)
}

pub fn basic_auth(username: &str, password: &str) -> (HeaderName, HeaderValue) {
    let encoded = STANDARD.encode(format!("{}:{}", username, password));
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Basic {}", encoded)).unwrap(),
    )
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

pub fn session_cookie(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::COOKIE,
        HeaderValue::from_str(&format!("Session-Token={}", token)).unwrap(),
    )
}

/// Create a user, optionally with a password, and return its wire form
pub async fn create_user(server: &TestServer, username: &str, password: Option<&str>) -> Value {
    let mut body = json!({"name": format!("User {}", username), "username": username});
    if let Some(password) = password {
        body["password"] = json!(password);
    }

    let response = server.post("/api/user").json(&body).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

pub fn assert_error(body: &Value, status: u16, message: &str) {
    assert_eq!(body["statusCode"], status, "body: {}", body);
    assert_eq!(body["message"], message, "body: {}", body);
    assert!(body.get("details").is_some(), "body: {}", body);
}
