//! HTTP tests for the `/api` index, time, user and event resources

mod common;

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use common::*;
use serde_json::{Value, json};

// =============================================================================
// Root and time
// =============================================================================

mod root_tests {
    use super::*;

    #[tokio::test]
    async fn test_index_lists_resources() {
        let server = test_server();
        let response = server.get("/api").await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["time"]["url"], "/api/time");
        assert_eq!(body["user"]["url"], "/api/user");
        assert_eq!(body["event"]["url"], "/api/event");
        assert_eq!(body["login"]["url"], "/api/login");
    }

    #[tokio::test]
    async fn test_time() {
        let server = test_server();
        let response = server.get("/api/time").await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["url"], "/api/time");
        let time = body["time"].as_str().unwrap();
        assert!(time.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
    }
}

// =============================================================================
// Users
// =============================================================================

mod user_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get() {
        let server = test_server();
        let created = create_user(&server, "jane", Some("secret")).await;

        let id = created["id"].as_str().unwrap();
        assert_eq!(created["url"], format!("/api/user/{}", id));
        assert_eq!(created["name"], "User jane");
        assert_eq!(created["username"], "jane");
        assert_eq!(
            created["password"],
            json!({"url": format!("/api/user/{}/password", id)})
        );

        let response = server.get(&format!("/api/user/{}", id)).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), created);
    }

    #[tokio::test]
    async fn test_list() {
        let server = test_server();
        let response = server.get("/api/user").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!([]));

        let jane = create_user(&server, "jane", None).await;
        let jim = create_user(&server, "jim", None).await;

        let body = server.get("/api/user").await.json::<Value>();
        assert_eq!(
            body,
            json!([
                {"id": jane["id"], "url": jane["url"]},
                {"id": jim["id"], "url": jim["url"]},
            ])
        );
    }

    #[tokio::test]
    async fn test_update() {
        let server = test_server();
        let user = create_user(&server, "jane", None).await;
        let url = user["url"].as_str().unwrap();

        let mut changed = user.clone();
        changed["name"] = json!("Jane Doe");
        let response = server.put(url).json(&changed).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), changed);

        let fetched = server.get(url).await.json::<Value>();
        assert_eq!(fetched["name"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let server = test_server();
        let response = server
            .put("/api/user/nope")
            .json(&json!({"name": "x", "username": "x"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete() {
        let server = test_server();
        let user = create_user(&server, "jane", None).await;
        let url = user["url"].as_str().unwrap();

        server.delete(url).await.assert_status(StatusCode::NO_CONTENT);
        server.get(url).await.assert_status(StatusCode::NOT_FOUND);
        // Deleting again is not an error
        server.delete(url).await.assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_invalid_user() {
        let server = test_server();
        let response = server.post("/api/user").json(&json!({"name": "x"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["statusCode"], 400);

        let response = server
            .post("/api/user")
            .json(&json!({"name": "x", "username": 12}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let server = test_server();
        create_user(&server, "jane", None).await;

        let response = server
            .post("/api/user")
            .json(&json!({"name": "Other", "username": "jane"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Events
// =============================================================================

mod event_tests {
    use super::*;

    fn conference() -> Value {
        json!({"name": "Conference", "startDate": "2024-05-01", "endDate": "2024-05-03"})
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let server = test_server();

        let response = server.post("/api/event").json(&conference()).await;
        response.assert_status(StatusCode::CREATED);
        let event = response.json::<Value>();
        let url = event["url"].as_str().unwrap().to_string();
        assert_eq!(event["name"], "Conference");
        assert_eq!(event["startDate"], "2024-05-01");

        let listed = server.get("/api/event").await.json::<Value>();
        assert_eq!(listed, json!([{"id": event["id"], "url": url}]));

        let response = server
            .put(&url)
            .json(&json!({
                "name": "Summit",
                "startDate": "2024-06-01T12:00:00Z",
                "endDate": "2024-06-02"
            }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["startDate"], "2024-06-01");

        server.delete(&url).await.assert_status(StatusCode::NO_CONTENT);
        server.get(&url).await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_id_is_ignored() {
        let server = test_server();
        let event = server.post("/api/event").json(&conference()).await.json::<Value>();
        let url = event["url"].as_str().unwrap();

        let mut body = conference();
        body["id"] = json!("elsewhere");
        let saved = server.put(url).json(&body).await.json::<Value>();
        assert_eq!(saved["id"], event["id"]);
        server.get("/api/event/elsewhere").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_date() {
        let server = test_server();
        let response = server
            .post("/api/event")
            .json(&json!({"name": "x", "startDate": "whenever", "endDate": "2024-05-03"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Errors
// =============================================================================

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_resource_is_json_404() {
        let server = test_server();
        let response = server.get("/api/event/nope").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_error(&response.json::<Value>(), 404, "No event found with id 'nope'");
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let server = test_server();
        for path in ["/api/", "/api/nothing", "/api/user/a/b/c"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::NOT_FOUND);
            assert_error(&response.json::<Value>(), 404, "Resource not found");
        }
    }

    #[tokio::test]
    async fn test_unknown_page_is_html_404() {
        let server = test_server();
        let response = server.get("/nothing/here").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("<html>"));
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let server = test_server();
        let response = server.method(Method::DELETE, "/api/time").await;
        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.json::<Value>()["statusCode"], 405);
    }

    #[tokio::test]
    async fn test_oversized_body() {
        let server = test_server();
        let response = server
            .post("/api/event")
            .content_type("application/json")
            .bytes(Bytes::from(vec![b' '; 3 * 1024 * 1024]))
            .await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.json::<Value>()["statusCode"], 413);
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let server = test_server();
        let response = server
            .post("/api/user")
            .content_type("application/json")
            .bytes(Bytes::from_static(b"{\"name\": "))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["statusCode"], 400);
    }
}

// =============================================================================
// Static client
// =============================================================================

mod client_tests {
    use super::*;
    use almanac::server::ServerBuilder;
    use almanac::storage::InMemoryStore;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_serves_client_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>almanac</h1>").unwrap();

        let app = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .with_client_dir(dir.path())
            .build()
            .unwrap();
        let server = TestServer::new(app);

        let response = server.get("/").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "<h1>almanac</h1>");

        let response = server.get("/missing.js").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("Resource not found"));

        // The API still wins over the client directory
        server.get("/api/time").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_shipped_client() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("client");
        let app = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .with_client_dir(dir)
            .build()
            .unwrap();
        let server = TestServer::new(app);

        let index = server.get("/").await;
        index.assert_status_ok();
        assert!(index.text().contains("id=\"settings\""));

        let script = server.get("/js/settings.js").await;
        script.assert_status_ok();
        assert!(script.text().contains("export class Settings"));

        server.get("/missing.html").await.assert_status(StatusCode::NOT_FOUND);
    }
}
