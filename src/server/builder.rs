//! ServerBuilder for fluent assembly of the HTTP server

use super::fallback::{api_not_found, method_not_allowed, page_not_found};
use super::login::LoginDescriptor;
use super::registry::ResourceRegistry;
use super::rest::RestDescriptor;
use super::time::TimeDescriptor;
use super::user::UserDescriptor;
use crate::resources::{EventFactory, SessionAuthenticator, TokenFactory, UserFactory};
use crate::storage::KeyValueStore;
use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    handler::HandlerWithoutStateExt,
    routing::{any, get},
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Builder for the almanac HTTP server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_store(InMemoryStore::new())
///     .with_client_dir("client")
///     .serve("127.0.0.1:8080")
///     .await?;
/// ```
#[derive(Default)]
pub struct ServerBuilder {
    store: Option<Arc<dyn KeyValueStore>>,
    client_dir: Option<PathBuf>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the store (required)
    pub fn with_store(self, store: impl KeyValueStore + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set a store that is already shared
    pub fn with_shared_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Serve the browser client from this directory at `/`
    ///
    /// Without one, every non-API path is a 404 page.
    pub fn with_client_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.client_dir = Some(dir.into());
        self
    }

    /// Register every resource kind against the store
    fn build_registry(store: Arc<dyn KeyValueStore>) -> ResourceRegistry {
        let users = Arc::new(UserFactory::new(store.clone()));
        let events = Arc::new(EventFactory::new(store.clone()));
        let tokens = Arc::new(TokenFactory::new(store));
        let sessions = Arc::new(SessionAuthenticator::new(users.clone(), tokens));

        let mut registry = ResourceRegistry::new();
        registry.register(Box::new(TimeDescriptor));
        registry.register(Box::new(UserDescriptor::new(users)));
        registry.register(Box::new(RestDescriptor::new(events)));
        registry.register(Box::new(LoginDescriptor::new(sessions)));
        registry
    }

    /// Build the final router
    ///
    /// This generates:
    /// - routes for every registered kind, and the `/api` index
    /// - JSON 404 and 405 responses for the API
    /// - static client files, with an HTML 404 page for anything else
    pub fn build(self) -> Result<Router> {
        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("KeyValueStore is required. Call .with_store()"))?;

        let registry = Self::build_registry(store);
        let index = Arc::new(registry.index());

        let app = registry
            .build_routes()
            .route("/api", get(api_index).with_state(index))
            .route("/api/", any(api_not_found))
            .route("/api/{*path}", any(api_not_found))
            .method_not_allowed_fallback(method_not_allowed);

        let app = match self.client_dir {
            Some(dir) => {
                tracing::debug!("Serving client from {}", dir.display());
                let client = ServeDir::new(dir).not_found_service(page_not_found.into_service());
                app.fallback_service(client)
            }
            None => app.fallback(page_not_found),
        };

        Ok(app.layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Listening at http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn api_index(State(index): State<Arc<Value>>) -> Json<Value> {
    Json(index.as_ref().clone())
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new();
        assert!(builder.store.is_none());
        assert!(builder.client_dir.is_none());
    }

    #[test]
    fn test_build_without_store_fails() {
        let err = ServerBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("KeyValueStore is required"));
    }

    #[test]
    fn test_build_produces_router() {
        let router = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .with_client_dir("client")
            .build();
        assert!(router.is_ok());
    }

    #[tokio::test]
    async fn test_router_answers_api_index() {
        use axum::body::{Body, to_bytes};
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        let router = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .build()
            .unwrap();

        let response = router
            .oneshot(Request::get("/api").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let index: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(index["user"]["url"], "/api/user");
    }

    #[test]
    fn test_registry_order() {
        let registry = ServerBuilder::build_registry(Arc::new(InMemoryStore::new()));
        assert_eq!(registry.kinds(), vec!["time", "user", "event", "login"]);
    }
}
