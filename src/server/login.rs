//! `/api/login`: session tokens over HTTP
//!
//! `POST` authenticates with any supported credentials and answers with the
//! user's session token, also set as the `Session-Token` cookie. `DELETE`
//! revokes it and clears the cookie.

use super::registry::ResourceDescriptor;
use crate::core::auth::{AuthProvider, Authenticated, Credentials, SESSION_COOKIE};
use crate::core::error::{ApiResult, AuthError};
use crate::core::resource::ResourceFactory;
use crate::resources::SessionAuthenticator;
use axum::{
    Json, Router,
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use std::sync::Arc;

pub const KIND: &str = "login";

#[derive(Clone)]
pub struct LoginState {
    sessions: Arc<SessionAuthenticator>,
}

impl FromRef<LoginState> for Arc<dyn AuthProvider> {
    fn from_ref(state: &LoginState) -> Self {
        state.sessions.clone()
    }
}

pub struct LoginDescriptor {
    state: LoginState,
}

impl LoginDescriptor {
    pub fn new(sessions: Arc<SessionAuthenticator>) -> Self {
        Self {
            state: LoginState { sessions },
        }
    }
}

impl ResourceDescriptor for LoginDescriptor {
    fn kind(&self) -> &str {
        KIND
    }

    fn build_routes(&self) -> Router {
        Router::new()
            .route(&format!("/api/{}", KIND), post(login).delete(logout))
            .with_state(self.state.clone())
    }
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// `Set-Cookie` value removing the session cookie
pub fn cleared_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE)
}

async fn login(
    State(state): State<LoginState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let credentials = Credentials::from_headers(&headers).ok_or(AuthError::NoCredentials)?;
    let token = state.sessions.login(&credentials).await?;

    tracing::info!(user_id = %token.content.user_id, "logged in");
    let body = state.sessions.tokens().to_rest(&token);
    Ok(([(header::SET_COOKIE, session_cookie(&token.id))], Json(body)))
}

async fn logout(
    State(state): State<LoginState>,
    Authenticated(context): Authenticated,
) -> ApiResult<impl IntoResponse> {
    state.sessions.logout(&context).await?;

    tracing::info!(user_id = %context.user_id, "logged out");
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cleared_cookie())],
    ))
}
