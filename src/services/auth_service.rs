//! Domain service for registration and access tokens.
//!
//! Registration is code-based: a signup mails a one-time confirmation code,
//! and redeeming that code yields a signed access token. There are no
//! passwords.

use thiserror::Error;

use crate::api::types::SignupResponse;
use crate::domain::Actor;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The username or email is already bound to a different account.
    #[error("{0}")]
    Conflict(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid confirmation code")]
    InvalidCode,

    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers `(username, email)` or re-registers the same pair, then
    /// mails a fresh confirmation code.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for malformed input or a reserved username
    /// - [`AuthError::Conflict`] if either field belongs to another account
    async fn signup(&self, username: &str, email: &str) -> Result<SignupResponse, AuthError>;

    /// Exchanges a confirmation code for an access token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotFound`] for an unknown username
    /// - [`AuthError::InvalidCode`] if the code is wrong, expired or already used
    async fn issue_token(&self, username: &str, code: &str) -> Result<String, AuthError>;

    /// Resolves a bearer token to the current state of its user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] if the token does not verify or
    /// its user no longer exists.
    async fn authenticate(&self, token: &str) -> Result<Actor, AuthError>;
}
