//! `/api/user`: the CRUD routes plus `POST /api/user/{id}/password`

use super::registry::ResourceDescriptor;
use super::rest::rest_routes;
use crate::core::error::ApiResult;
use crate::core::resource::ResourceFactory;
use crate::resources::user::{KIND, PasswordChange, UserFactory};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::post,
};
use serde_json::Value;
use std::sync::Arc;

pub struct UserDescriptor {
    users: Arc<UserFactory>,
}

impl UserDescriptor {
    pub fn new(users: Arc<UserFactory>) -> Self {
        Self { users }
    }
}

impl ResourceDescriptor for UserDescriptor {
    fn kind(&self) -> &str {
        KIND
    }

    fn build_routes(&self) -> Router {
        let password = Router::new()
            .route(&format!("/api/{}/{{id}}/password", KIND), post(change_password))
            .with_state(self.users.clone());

        rest_routes(self.users.clone()).merge(password)
    }
}

async fn change_password(
    State(users): State<Arc<UserFactory>>,
    Path(id): Path<String>,
    body: Result<Json<PasswordChange>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(change) = body?;
    let user = users.change_password(&id, &change).await?;
    Ok(Json(users.to_rest(&user)))
}
