//! Generic REST handlers over a [`ResourceFactory`]
//!
//! | method | path | response |
//! |--------|------|----------|
//! | GET | `/api/{kind}` | 200, `[{id, url}]` |
//! | POST | `/api/{kind}` | 201, created resource |
//! | GET | `/api/{kind}/{id}` | 200, resource |
//! | PUT | `/api/{kind}/{id}` | 200, saved resource |
//! | DELETE | `/api/{kind}/{id}` | 204 |

use super::registry::ResourceDescriptor;
use crate::core::error::ApiResult;
use crate::core::resource::ResourceFactory;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde_json::Value;
use std::sync::Arc;

/// Exposes a factory with the standard CRUD routes
pub struct RestDescriptor<F: ResourceFactory> {
    factory: Arc<F>,
}

impl<F: ResourceFactory> RestDescriptor<F> {
    pub fn new(factory: Arc<F>) -> Self {
        Self { factory }
    }
}

impl<F: ResourceFactory> ResourceDescriptor for RestDescriptor<F> {
    fn kind(&self) -> &str {
        self.factory.kind()
    }

    fn build_routes(&self) -> Router {
        rest_routes(self.factory.clone())
    }
}

/// CRUD routes for one kind
pub fn rest_routes<F: ResourceFactory>(factory: Arc<F>) -> Router {
    let collection = format!("/api/{}", factory.kind());
    let item = format!("{}/{{id}}", collection);

    Router::new()
        .route(&collection, get(list::<F>).post(create::<F>))
        .route(&item, get(read::<F>).put(update::<F>).delete(remove::<F>))
        .with_state(factory)
}

async fn list<F: ResourceFactory>(State(factory): State<Arc<F>>) -> ApiResult<Json<Vec<Value>>> {
    let ids = factory.load_all().await?;
    Ok(Json(ids.iter().map(|id| factory.id_to_rest(id)).collect()))
}

async fn read<F: ResourceFactory>(
    State(factory): State<Arc<F>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let resource = factory.load(&id).await?;
    Ok(Json(factory.to_rest(&resource)))
}

async fn create<F: ResourceFactory>(
    State(factory): State<Arc<F>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(input) = body?;
    let resource = factory.create(&input).await?;

    tracing::info!(kind = factory.kind(), id = %resource.id, "created");
    Ok((StatusCode::CREATED, Json(factory.to_rest(&resource))))
}

async fn update<F: ResourceFactory>(
    State(factory): State<Arc<F>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(input) = body?;
    let resource = factory.save(&id, &input).await?;
    Ok(Json(factory.to_rest(&resource)))
}

async fn remove<F: ResourceFactory>(
    State(factory): State<Arc<F>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    factory.delete(&id).await?;

    tracing::info!(kind = factory.kind(), id = %id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}
