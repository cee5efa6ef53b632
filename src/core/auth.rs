//! Authentication for almanac
//!
//! A request can prove who it is three ways, checked in this order:
//! - HTTP Basic (username and password)
//! - `Authorization: Bearer <token>`
//! - the `Session-Token` cookie
//!
//! Only the first method present is tried. A request carrying none of them
//! fails with "No credentials"; one whose credentials do not resolve to a
//! user fails with "Invalid credentials".

use crate::core::error::{ApiError, ApiResult, AuthError};
use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};
use axum_extra::extract::CookieJar;
use axum_extra::headers::{
    Authorization, HeaderMapExt,
    authorization::{Basic, Bearer},
};
use std::sync::Arc;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "Session-Token";

/// Credentials found on a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Bearer(String),
    Cookie(String),
}

impl Credentials {
    /// Pick the credentials of a request, by precedence
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        basic(headers)
            .or_else(|| bearer(headers))
            .or_else(|| cookie(headers, SESSION_COOKIE).map(Credentials::Cookie))
    }

    /// Session token carried by these credentials, if any
    pub fn token(&self) -> Option<&str> {
        match self {
            Credentials::Basic { .. } => None,
            Credentials::Bearer(token) | Credentials::Cookie(token) => Some(token),
        }
    }
}

fn basic(headers: &HeaderMap) -> Option<Credentials> {
    let basic = headers.typed_get::<Authorization<Basic>>()?;
    Some(Credentials::Basic {
        username: basic.username().to_string(),
        password: basic.password().to_string(),
    })
}

fn bearer(headers: &HeaderMap) -> Option<Credentials> {
    let bearer = headers.typed_get::<Authorization<Bearer>>()?;
    let token = bearer.token().trim();
    if token.is_empty() {
        return None;
    }
    Some(Credentials::Bearer(token.to_string()))
}

/// Value of the named cookie, with any surrounding quotes removed
pub fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    let value = jar.get(name)?.value_trimmed();
    (!value.is_empty()).then(|| value.to_string())
}

/// How a request authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Basic,
    Bearer,
    Cookie,
}

impl From<&Credentials> for AuthMethod {
    fn from(credentials: &Credentials) -> Self {
        match credentials {
            Credentials::Basic { .. } => AuthMethod::Basic,
            Credentials::Bearer(_) => AuthMethod::Bearer,
            Credentials::Cookie(_) => AuthMethod::Cookie,
        }
    }
}

/// The authenticated user of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub method: AuthMethod,
}

/// Resolves credentials to a user
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Check one set of credentials
    async fn authenticate(&self, credentials: &Credentials) -> ApiResult<AuthContext>;

    /// Authenticate a request from its headers
    async fn authenticate_headers(&self, headers: &HeaderMap) -> ApiResult<AuthContext> {
        let credentials = Credentials::from_headers(headers).ok_or(AuthError::NoCredentials)?;
        self.authenticate(&credentials).await
    }
}

/// Extractor for handlers that need a logged-in user
///
/// The router state must provide an `Arc<dyn AuthProvider>`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    Arc<dyn AuthProvider>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let provider = Arc::<dyn AuthProvider>::from_ref(state);
        let context = provider.authenticate_headers(&parts.headers).await?;
        Ok(Authenticated(context))
    }
}
