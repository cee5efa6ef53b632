//! Generic resource mapping over the key-value store
//!
//! A resource moves between three shapes:
//!
//! - **wire**: the JSON a client sends or receives
//! - **content**: a typed struct, validated
//! - **data**: the flat [`Record`] kept in the store
//!
//! [`ResourceFactory`] is implemented once per resource kind. Kinds supply
//! the conversions; the CRUD operations come for free and are written only
//! against those conversions and the store.

use crate::core::error::{ApiError, ApiResult, ResourceError};
use crate::storage::{KeyValueStore, Record, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

/// A stored resource: its id plus typed content
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<C> {
    pub id: String,
    pub content: C,
}

impl<C> Resource<C> {
    pub fn new(id: impl Into<String>, content: C) -> Self {
        Self {
            id: id.into(),
            content,
        }
    }
}

/// CRUD mapping for one resource kind
#[async_trait]
pub trait ResourceFactory: Send + Sync + 'static {
    /// Validated content of this kind
    type Content: Clone + Send + Sync + 'static;

    /// Type namespace in the store and path segment under `/api`
    fn kind(&self) -> &'static str;

    /// Store backing this kind
    fn store(&self) -> &Arc<dyn KeyValueStore>;

    /// Validate wire input into content
    fn new_content(&self, input: &Value) -> ApiResult<Self::Content>;

    /// Rebuild content from a stored record
    fn from_data(&self, id: &str, record: &Record) -> StoreResult<Self::Content>;

    /// Flatten content into a record
    fn to_data(&self, content: &Self::Content) -> Record;

    /// Wire form of a resource
    fn to_rest(&self, resource: &Resource<Self::Content>) -> Value;

    /// Wire form of a bare id, as returned by list
    fn id_to_rest(&self, id: &str) -> Value {
        json!({ "id": id, "url": self.make_url(&[id]) })
    }

    /// `/api/{kind}/{path...}`
    fn make_url(&self, path: &[&str]) -> String {
        format!("/api/{}/{}", self.kind(), path.join("/"))
    }

    /// Combine incoming content with what is stored, on save
    ///
    /// Kinds holding fields that a save must not overwrite override this.
    fn merge_content(&self, _existing: Self::Content, incoming: Self::Content) -> Self::Content {
        incoming
    }

    /// Checks that need the store (uniqueness); `id` is `None` on create
    async fn check_stored(&self, _id: Option<&str>, _content: &Self::Content) -> ApiResult<()> {
        Ok(())
    }

    /// Ids of all resources of this kind
    async fn load_all(&self) -> ApiResult<Vec<String>> {
        Ok(self.store().list(self.kind()).await?)
    }

    /// Load one resource
    async fn load(&self, id: &str) -> ApiResult<Resource<Self::Content>> {
        let record = match self.store().get(self.kind(), id).await {
            Ok(record) => record,
            Err(StoreError::Lookup { .. }) => {
                return Err(ResourceError::missing(self.kind(), id).into());
            }
            Err(e) => return Err(e.into()),
        };

        let content = self.from_data(id, &record)?;
        Ok(Resource::new(id, content))
    }

    /// Validate and store already-built content under a fresh id
    async fn insert(&self, content: Self::Content) -> ApiResult<Resource<Self::Content>> {
        self.check_stored(None, &content).await?;
        let id = self.store().add(self.kind(), self.to_data(&content)).await?;

        tracing::debug!(kind = self.kind(), id = %id, "created");
        Ok(Resource::new(id, content))
    }

    /// Create a resource from wire input
    async fn create(&self, input: &Value) -> ApiResult<Resource<Self::Content>> {
        let content = self.new_content(input)?;
        self.insert(content).await
    }

    /// Replace the content of an existing resource from wire input
    async fn save(&self, id: &str, input: &Value) -> ApiResult<Resource<Self::Content>> {
        let incoming = self.new_content(input)?;
        let existing = self.load(id).await?;
        let content = self.merge_content(existing.content, incoming);

        self.check_stored(Some(id), &content).await?;
        self.store()
            .set(self.kind(), id, self.to_data(&content))
            .await?;

        tracing::debug!(kind = self.kind(), id = %id, "saved");
        Ok(Resource::new(id, content))
    }

    /// Delete a resource; deleting a missing resource succeeds
    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.store().delete(self.kind(), id).await?;

        tracing::debug!(kind = self.kind(), id = %id, "deleted");
        Ok(())
    }

    /// First resource whose stored property equals `value`
    async fn find(&self, property: &str, value: &Value) -> ApiResult<Option<String>> {
        Ok(self.store().find(self.kind(), property, value).await?)
    }
}

// =============================================================================
// Field helpers shared by resource kinds
// =============================================================================

/// Wire input as a JSON object
pub fn input_object<'a>(
    kind: &str,
    input: &'a Value,
) -> ApiResult<&'a serde_json::Map<String, Value>> {
    input.as_object().ok_or_else(|| {
        ApiError::from(ResourceError::Invalid {
            kind: kind.to_string(),
            field: None,
            message: "expected a JSON object".to_string(),
        })
    })
}

/// A required string field of wire input
pub fn required_str<'a>(kind: &str, input: &'a Value, field: &str) -> ApiResult<&'a str> {
    match input_object(kind, input)?.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => {
            Err(ResourceError::invalid(kind, field, format!("'{}' must be a string", field)).into())
        }
        None => {
            Err(ResourceError::invalid(kind, field, format!("'{}' is required", field)).into())
        }
    }
}

/// An optional string field of wire input; `null` counts as absent
pub fn optional_str<'a>(kind: &str, input: &'a Value, field: &str) -> ApiResult<Option<&'a str>> {
    match input_object(kind, input)?.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => {
            Err(ResourceError::invalid(kind, field, format!("'{}' must be a string", field)).into())
        }
    }
}

/// A required string property of a stored record
pub fn stored_str(kind: &str, id: &str, record: &Record, field: &str) -> StoreResult<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::format(kind, id, format!("missing string property '{}'", field)))
}

/// An optional string property of a stored record
pub fn stored_opt_str(
    kind: &str,
    id: &str,
    record: &Record,
    field: &str,
) -> StoreResult<Option<String>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(StoreError::format(
            kind,
            id,
            format!("property '{}' is not a string", field),
        )),
    }
}
