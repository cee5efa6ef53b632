//! Resource registry for collecting descriptors and building `/api` routes

use axum::Router;
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

/// Describes how one kind is exposed under `/api/{kind}`
pub trait ResourceDescriptor: Send + Sync {
    /// Path segment under `/api` (e.g. "user")
    fn kind(&self) -> &str;

    /// URL listed for this kind in the `/api` index
    fn url(&self) -> String {
        format!("/api/{}", self.kind())
    }

    /// Routes for this kind, with absolute paths
    fn build_routes(&self) -> Router;
}

/// All kinds exposed by the server, in registration order
#[derive(Default)]
pub struct ResourceRegistry {
    descriptors: IndexMap<String, Box<dyn ResourceDescriptor>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; a second descriptor for the same kind replaces the first
    pub fn register(&mut self, descriptor: Box<dyn ResourceDescriptor>) {
        let kind = descriptor.kind().to_string();
        tracing::debug!(kind = %kind, "registering resource");
        self.descriptors.insert(kind, descriptor);
    }

    /// Merge the routes of every registered kind
    pub fn build_routes(&self) -> Router {
        let mut router = Router::new();

        for descriptor in self.descriptors.values() {
            router = router.merge(descriptor.build_routes());
        }

        router
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    /// Body of `GET /api`: `{kind: {url}}` for each kind
    pub fn index(&self) -> Value {
        let index: Map<String, Value> = self
            .descriptors
            .iter()
            .map(|(kind, descriptor)| (kind.clone(), json!({ "url": descriptor.url() })))
            .collect();
        Value::Object(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubDescriptor(&'static str);

    impl ResourceDescriptor for StubDescriptor {
        fn kind(&self) -> &str {
            self.0
        }

        fn build_routes(&self) -> Router {
            Router::new()
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = ResourceRegistry::new();
        assert!(registry.kinds().is_empty());
        assert_eq!(registry.index(), json!({}));
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = ResourceRegistry::new();
        registry.register(Box::new(StubDescriptor("time")));
        registry.register(Box::new(StubDescriptor("user")));
        registry.register(Box::new(StubDescriptor("event")));
        assert_eq!(registry.kinds(), vec!["time", "user", "event"]);
    }

    #[test]
    fn test_register_duplicate_replaces() {
        let mut registry = ResourceRegistry::new();
        registry.register(Box::new(StubDescriptor("user")));
        registry.register(Box::new(StubDescriptor("user")));
        assert_eq!(registry.kinds().len(), 1);
    }

    #[test]
    fn test_index() {
        let mut registry = ResourceRegistry::new();
        registry.register(Box::new(StubDescriptor("time")));
        registry.register(Box::new(StubDescriptor("login")));
        assert_eq!(
            registry.index(),
            json!({"time": {"url": "/api/time"}, "login": {"url": "/api/login"}})
        );
    }

    #[test]
    fn test_build_routes_empty_registry() {
        let _router = ResourceRegistry::new().build_routes();
    }
}
