//! Core types: errors, credentials, authentication and the resource abstraction

pub mod auth;
pub mod credentials;
pub mod error;
pub mod resource;

pub use auth::{AuthContext, AuthMethod, AuthProvider, Authenticated, Credentials};
pub use error::{ApiError, ApiResult, AuthError, RequestError, ResourceError};
pub use resource::{Resource, ResourceFactory};
