//! User accounts
//!
//! The password is only ever held as an argon2 hash. It can be given on
//! create or changed through [`UserFactory::change_password`]; a save never
//! touches it.

use crate::core::credentials::{hash_password, verify_password};
use crate::core::error::{ApiResult, RequestError, ResourceError};
use crate::core::resource::{
    Resource, ResourceFactory, optional_str, required_str, stored_opt_str, stored_str,
};
use crate::storage::{KeyValueStore, Record, StoreResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use validator::Validate;

pub const KIND: &str = "user";

/// Validated user content
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub name: String,
    pub username: String,
    pub password_hash: Option<String>,
}

impl User {
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Body of `POST /api/user/{id}/password`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,

    /// Required once a password has been set
    pub old_password: Option<String>,
}

pub struct UserFactory {
    store: Arc<dyn KeyValueStore>,
}

impl UserFactory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Id of the user with this username
    pub async fn find_by_username(&self, username: &str) -> ApiResult<Option<String>> {
        self.find("username", &json!(username)).await
    }

    /// Replace the stored password hash
    pub async fn set_password(&self, id: &str, password: &str) -> ApiResult<()> {
        // 404 rather than silently creating a record
        self.load(id).await?;

        let mut record = Record::new();
        record.insert("password".to_string(), json!(hash_password(password)?));
        self.store.update(KIND, id, record).await?;

        tracing::info!(user_id = %id, "password changed");
        Ok(())
    }

    /// Whether `password` matches; false when no password is set
    pub async fn check_password(&self, id: &str, password: &str) -> ApiResult<bool> {
        let user = self.load(id).await?;
        match &user.content.password_hash {
            Some(hash) => Ok(verify_password(password, hash)?),
            None => Ok(false),
        }
    }

    /// Apply a password change, verifying the old password when one is set
    pub async fn change_password(
        &self,
        id: &str,
        change: &PasswordChange,
    ) -> ApiResult<Resource<User>> {
        change.validate()?;

        let user = self.load(id).await?;
        if let Some(hash) = &user.content.password_hash {
            let old = change
                .old_password
                .as_deref()
                .ok_or(RequestError::IncorrectPassword)?;
            if !verify_password(old, hash)? {
                return Err(RequestError::IncorrectPassword.into());
            }
        }

        self.set_password(id, &change.password).await?;
        self.load(id).await
    }
}

#[async_trait]
impl ResourceFactory for UserFactory {
    type Content = User;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn new_content(&self, input: &Value) -> ApiResult<User> {
        Ok(User {
            name: required_str(KIND, input, "name")?.to_string(),
            username: required_str(KIND, input, "username")?.to_string(),
            password_hash: None,
        })
    }

    fn from_data(&self, id: &str, record: &Record) -> StoreResult<User> {
        Ok(User {
            name: stored_str(KIND, id, record, "name")?,
            username: stored_str(KIND, id, record, "username")?,
            password_hash: stored_opt_str(KIND, id, record, "password")?,
        })
    }

    fn to_data(&self, content: &User) -> Record {
        let mut record = Record::new();
        record.insert("name".to_string(), json!(content.name));
        record.insert("username".to_string(), json!(content.username));
        record.insert("password".to_string(), json!(content.password_hash));
        record
    }

    fn to_rest(&self, resource: &Resource<User>) -> Value {
        json!({
            "id": resource.id,
            "url": self.make_url(&[&resource.id]),
            "name": resource.content.name,
            "username": resource.content.username,
            "password": { "url": self.make_url(&[&resource.id, "password"]) },
        })
    }

    fn merge_content(&self, existing: User, incoming: User) -> User {
        User {
            password_hash: existing.password_hash,
            ..incoming
        }
    }

    async fn check_stored(&self, id: Option<&str>, content: &User) -> ApiResult<()> {
        match self.find_by_username(&content.username).await? {
            Some(other) if Some(other.as_str()) != id => Err(ResourceError::invalid(
                KIND,
                "username",
                format!("username '{}' is already in use", content.username),
            )
            .into()),
            _ => Ok(()),
        }
    }

    async fn create(&self, input: &Value) -> ApiResult<Resource<User>> {
        let mut content = self.new_content(input)?;
        if let Some(password) = optional_str(KIND, input, "password")? {
            if password.is_empty() {
                return Err(
                    ResourceError::invalid(KIND, "password", "password must not be empty").into(),
                );
            }
            content.password_hash = Some(hash_password(password)?);
        }
        self.insert(content).await
    }
}
