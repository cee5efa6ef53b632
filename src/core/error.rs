//! Typed error handling for the API
//!
//! Every failure a handler can hit is an [`ApiError`]. Each category knows
//! its HTTP status and a machine-readable error code, and `ApiError`
//! renders itself as `{statusCode, message, details}`.
//!
//! # Error Categories
//!
//! - [`ResourceError`]: invalid input for a resource kind, or a missing resource
//! - [`AuthError`]: missing or wrong credentials
//! - [`RequestError`]: malformed requests, unknown routes, unsupported methods
//! - [`StoreError`]: failures of the key-value backend
//!
//! # Example
//!
//! ```rust,ignore
//! async fn get_user(id: &str) -> ApiResult<Resource<User>> {
//!     users.load(id).await
//! }
//!
//! match get_user("nope").await {
//!     Err(ApiError::Resource(ResourceError::Missing { id, .. })) => println!("{} is gone", id),
//!     Err(e) => eprintln!("Other error: {}", e),
//!     Ok(user) => println!("Found: {}", user.id),
//! }
//! ```

use crate::storage::StoreError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Message sent to clients for any 500, whatever the cause
pub const UNEXPECTED_ERROR: &str = "Unexpected error";

/// The main error type for the API
#[derive(Debug)]
pub enum ApiError {
    /// Resource validation and lookup errors
    Resource(ResourceError),

    /// Authentication errors
    Auth(AuthError),

    /// HTTP/request errors
    Request(RequestError),

    /// Storage backend errors
    Store(StoreError),

    /// Anything else (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Resource(e) => write!(f, "{}", e),
            ApiError::Auth(e) => write!(f, "{}", e),
            ApiError::Request(e) => write!(f, "{}", e),
            ApiError::Store(e) => write!(f, "{}", e),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Resource(e) => Some(e),
            ApiError::Auth(e) => Some(e),
            ApiError::Request(e) => Some(e),
            ApiError::Store(e) => Some(e),
            ApiError::Internal(_) => None,
        }
    }
}

/// Error body sent to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status, repeated in the body
    pub status_code: u16,
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details, `null` when there are none
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Resource(e) => e.status_code(),
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Request(e) => e.status_code(),
            ApiError::Store(StoreError::Lookup { .. }) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Resource(e) => e.error_code(),
            ApiError::Auth(e) => e.error_code(),
            ApiError::Request(e) => e.error_code(),
            ApiError::Store(StoreError::Lookup { .. }) => "NOT_FOUND",
            ApiError::Store(StoreError::Format { .. }) => "CORRUPTED_DATA",
            ApiError::Store(StoreError::Backend { .. }) => "STORE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    ///
    /// Server errors never leak their cause to the client.
    pub fn to_response(&self) -> ErrorResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            UNEXPECTED_ERROR.to_string()
        } else {
            self.to_string()
        };

        ErrorResponse {
            status_code: status.as_u16(),
            code: self.error_code().to_string(),
            message,
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Resource(ResourceError::Missing { kind, id }) => {
                Some(serde_json::json!({ "type": kind, "id": id }))
            }
            ApiError::Resource(ResourceError::Invalid {
                kind,
                field: Some(field),
                ..
            }) => Some(serde_json::json!({ "type": kind, "field": field })),
            ApiError::Request(RequestError::InvalidFields { fields }) => {
                Some(serde_json::json!({ "fields": fields }))
            }
            ApiError::Request(RequestError::NotFound { path }) => {
                Some(serde_json::json!({ "path": path }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "{}", status);
        } else {
            tracing::warn!(code = self.error_code(), "{} {}", status.as_u16(), self);
        }

        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Resource Errors
// =============================================================================

/// Errors related to resource validation and lookup
#[derive(Debug)]
pub enum ResourceError {
    /// Input does not describe a valid resource of this kind
    Invalid {
        kind: String,
        field: Option<String>,
        message: String,
    },

    /// No resource of this kind with this id
    Missing { kind: String, id: String },
}

impl ResourceError {
    pub fn invalid(kind: &str, field: &str, message: impl Into<String>) -> Self {
        ResourceError::Invalid {
            kind: kind.to_string(),
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    pub fn missing(kind: &str, id: &str) -> Self {
        ResourceError::Missing {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ResourceError::Invalid { .. } => StatusCode::BAD_REQUEST,
            ResourceError::Missing { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ResourceError::Invalid { .. } => "INVALID_RESOURCE",
            ResourceError::Missing { .. } => "RESOURCE_NOT_FOUND",
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Invalid { kind, message, .. } => {
                write!(f, "Invalid {}: {}", kind, message)
            }
            ResourceError::Missing { kind, id } => {
                write!(f, "No {} found with id '{}'", kind, id)
            }
        }
    }
}

impl std::error::Error for ResourceError {}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        ApiError::Resource(err)
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Errors related to authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request carries no credentials at all
    NoCredentials,

    /// Credentials were given but do not resolve to a user
    InvalidCredentials,
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NoCredentials => "NO_CREDENTIALS",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NoCredentials => write!(f, "No credentials"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// A single field failing validation
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Body is not valid JSON, or not the JSON we expected
    InvalidBody { message: String },

    /// Body is over the size limit
    BodyTooLarge { message: String },

    /// Body parsed but some fields failed validation
    InvalidFields { fields: Vec<FieldValidationError> },

    /// The old password given with a password change is wrong
    IncorrectPassword,

    /// No route for this path
    NotFound { path: String },

    /// Route exists but not for this method
    MethodNotAllowed { method: String, path: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
            RequestError::BodyTooLarge { message } => {
                write!(f, "Request body too large: {}", message)
            }
            RequestError::InvalidFields { fields } => {
                let names: Vec<&str> = fields.iter().map(|e| e.field.as_str()).collect();
                write!(f, "Invalid fields: {}", names.join(", "))
            }
            RequestError::IncorrectPassword => write!(f, "Incorrect password"),
            RequestError::NotFound { .. } => write!(f, "Resource not found"),
            RequestError::MethodNotAllowed { method, path } => {
                write!(f, "Method {} not allowed on {}", method, path)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::InvalidFields { .. } => StatusCode::BAD_REQUEST,
            RequestError::IncorrectPassword => StatusCode::BAD_REQUEST,
            RequestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RequestError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::BodyTooLarge { .. } => "BODY_TOO_LARGE",
            RequestError::InvalidFields { .. } => "INVALID_FIELDS",
            RequestError::IncorrectPassword => "INCORRECT_PASSWORD",
            RequestError::NotFound { .. } => "NOT_FOUND",
            RequestError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        ApiError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::Request(RequestError::BodyTooLarge { message })
        } else {
            ApiError::Request(RequestError::InvalidBody { message })
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Request(RequestError::InvalidBody {
            message: err.to_string(),
        })
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::Request(RequestError::InvalidFields { fields })
    }
}

impl From<argon2::password_hash::Error> for ApiError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ApiError::Internal(format!("password hashing failed: {}", err))
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
