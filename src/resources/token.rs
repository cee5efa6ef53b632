//! Session tokens
//!
//! A token's id is the secret itself, so tokens are never listed or exposed
//! under their own route. Each user has at most one live token; logging in
//! again hands back the same one.

use super::user;
use crate::core::credentials::new_token;
use crate::core::error::ApiResult;
use crate::core::resource::{Resource, ResourceFactory, required_str, stored_str};
use crate::storage::{KeyValueStore, Record, StoreResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

pub const KIND: &str = "token";

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub user_id: String,
}

pub struct TokenFactory {
    store: Arc<dyn KeyValueStore>,
}

impl TokenFactory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Issue a fresh token for a user
    pub async fn issue(&self, user_id: &str) -> ApiResult<Resource<Token>> {
        self.create(&json!({ "userId": user_id })).await
    }

    /// The live token of a user, if any
    pub async fn find_by_user(&self, user_id: &str) -> ApiResult<Option<Resource<Token>>> {
        match self.find("userId", &json!(user_id)).await? {
            Some(id) => Ok(Some(self.load(&id).await?)),
            None => Ok(None),
        }
    }

    /// The user's live token, issuing one when there is none
    pub async fn find_or_issue(&self, user_id: &str) -> ApiResult<Resource<Token>> {
        match self.find_by_user(user_id).await? {
            Some(token) => Ok(token),
            None => self.issue(user_id).await,
        }
    }

    /// Revoke the user's token; returns whether there was one
    pub async fn revoke_for_user(&self, user_id: &str) -> ApiResult<bool> {
        match self.find("userId", &json!(user_id)).await? {
            Some(id) => {
                self.delete(&id).await?;
                tracing::info!(user_id = %user_id, "session token revoked");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ResourceFactory for TokenFactory {
    type Content = Token;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn new_content(&self, input: &Value) -> ApiResult<Token> {
        Ok(Token {
            user_id: required_str(KIND, input, "userId")?.to_string(),
        })
    }

    fn from_data(&self, id: &str, record: &Record) -> StoreResult<Token> {
        Ok(Token {
            user_id: stored_str(KIND, id, record, "userId")?,
        })
    }

    fn to_data(&self, content: &Token) -> Record {
        let mut record = Record::new();
        record.insert("userId".to_string(), json!(content.user_id));
        record
    }

    /// Login response: the token plus a reference to its user
    fn to_rest(&self, resource: &Resource<Token>) -> Value {
        let user_id = &resource.content.user_id;
        json!({
            "sessionToken": resource.id,
            "userId": user_id,
            "user": {
                "id": user_id,
                "url": format!("/api/{}/{}", user::KIND, user_id),
            },
        })
    }

    /// Tokens are keyed by a random secret, not a record id
    async fn insert(&self, content: Token) -> ApiResult<Resource<Token>> {
        let id = new_token();
        self.store().set(KIND, &id, self.to_data(&content)).await?;

        tracing::debug!(user_id = %content.user_id, "session token issued");
        Ok(Resource::new(id, content))
    }
}
