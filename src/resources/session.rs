//! Logging in and out against the user and token stores

use super::token::{Token, TokenFactory};
use super::user::UserFactory;
use crate::core::auth::{AuthContext, AuthMethod, AuthProvider, Credentials};
use crate::core::error::{ApiError, ApiResult, AuthError, ResourceError};
use crate::core::resource::{Resource, ResourceFactory};
use async_trait::async_trait;
use std::sync::Arc;

/// [`AuthProvider`] backed by stored users and session tokens
pub struct SessionAuthenticator {
    users: Arc<UserFactory>,
    tokens: Arc<TokenFactory>,
}

impl SessionAuthenticator {
    pub fn new(users: Arc<UserFactory>, tokens: Arc<TokenFactory>) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &Arc<TokenFactory> {
        &self.tokens
    }

    async fn by_password(&self, username: &str, password: &str) -> ApiResult<String> {
        let id = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if self.users.check_password(&id, password).await? {
            Ok(id)
        } else {
            Err(AuthError::InvalidCredentials.into())
        }
    }

    async fn by_token(&self, token: &str) -> ApiResult<String> {
        let user_id = match self.tokens.load(token).await {
            Ok(token) => token.content.user_id,
            Err(ApiError::Resource(ResourceError::Missing { .. })) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        // Tokens outlive their user only until they are next used
        match self.users.load(&user_id).await {
            Ok(_) => Ok(user_id),
            Err(ApiError::Resource(ResourceError::Missing { .. })) => {
                tracing::info!(user_id = %user_id, "dropping token of deleted user");
                self.tokens.delete(token).await?;
                Err(AuthError::InvalidCredentials.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Log in: the session token of the authenticated user
    ///
    /// Reuses a live token so that every method yields the same session.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Resource<Token>> {
        let context = self.authenticate(credentials).await?;
        match credentials.token() {
            Some(token) => self.tokens.load(token).await,
            None => self.tokens.find_or_issue(&context.user_id).await,
        }
    }

    /// Log out: revoke the user's session token
    pub async fn logout(&self, context: &AuthContext) -> ApiResult<()> {
        self.tokens.revoke_for_user(&context.user_id).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for SessionAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> ApiResult<AuthContext> {
        let user_id = match credentials {
            Credentials::Basic { username, password } => {
                self.by_password(username, password).await?
            }
            Credentials::Bearer(token) | Credentials::Cookie(token) => {
                self.by_token(token).await?
            }
        };

        let method = AuthMethod::from(credentials);
        tracing::debug!(user_id = %user_id, method = ?method, "authenticated");
        Ok(AuthContext { user_id, method })
    }
}
