//! # almanac
//!
//! A small REST backend for users, calendar events and login sessions, kept
//! in a key-value store and served alongside a static browser client.
//!
//! ## Layers
//!
//! - **storage**: flat records namespaced by type, in memory or in Redis
//! - **core**: the generic [`ResourceFactory`](core::ResourceFactory) mapping
//!   wire JSON to typed content to stored records, plus errors and auth
//! - **resources**: the user, event and token kinds
//! - **server**: axum routes assembled by [`ServerBuilder`](server::ServerBuilder)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use almanac::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     ServerBuilder::new()
//!         .with_store(InMemoryStore::new())
//!         .with_client_dir("client")
//!         .serve("127.0.0.1:8080")
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod resources;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::core::{
        ApiError, ApiResult, AuthContext, AuthProvider, Authenticated, Credentials, Resource,
        ResourceFactory,
    };
    pub use crate::resources::{
        EventFactory, PasswordChange, SessionAuthenticator, TokenFactory, UserFactory,
    };
    pub use crate::server::{ResourceDescriptor, ResourceRegistry, ServerBuilder};
    #[cfg(feature = "redis")]
    pub use crate::storage::RedisStore;
    pub use crate::storage::{InMemoryStore, KeyValueStore, Record, StoreError};
}
