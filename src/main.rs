//! almanac server binary
//!
//! Usage: `almanac [config.yaml]`. The config path may also be given through
//! `ALMANAC_CONFIG`.

use almanac::config::{AppConfig, StoreBackend, StoreConfig};
use almanac::server::ServerBuilder;
use almanac::storage::{InMemoryStore, KeyValueStore};
use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ALMANAC_CONFIG").ok());
    let config = AppConfig::load(path.as_deref())?;

    let default_level = if config.server.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Some(path) = &path {
        tracing::info!("Loaded configuration from {}", path);
    }

    let store = open_store(&config.store).await?;

    ServerBuilder::new()
        .with_shared_store(store)
        .with_client_dir(&config.client.path)
        .serve(&config.server.address())
        .await
}

async fn open_store(config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        #[cfg(feature = "redis")]
        StoreBackend::Redis => {
            tracing::info!("Using Redis store at {}", config.url);
            let store = almanac::storage::RedisStore::connect(&config.url).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis => {
            anyhow::bail!("the redis store backend needs the `redis` feature")
        }
    }
}
