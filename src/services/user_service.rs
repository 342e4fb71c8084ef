//! Domain service for account management: the admin-only user directory and
//! the self-service profile.

use thiserror::Error;

use crate::api::types::{CreateUserRequest, Page, UpdateUserRequest, UserDto};
use crate::domain::Actor;
use crate::domain::access::Denial;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Denial> for UserError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => Self::Unauthorized,
            Denial::Forbidden => Self::Forbidden,
        }
    }
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Users ordered by username, optionally filtered by a username substring.
    async fn list(
        &self,
        actor: &Actor,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Page<UserDto>, UserError>;

    async fn create(&self, actor: &Actor, request: CreateUserRequest) -> Result<UserDto, UserError>;

    async fn get(&self, actor: &Actor, username: &str) -> Result<UserDto, UserError>;

    async fn update(
        &self,
        actor: &Actor,
        username: &str,
        request: UpdateUserRequest,
    ) -> Result<UserDto, UserError>;

    /// Deletes the account with its reviews, comments and confirmation code.
    async fn delete(&self, actor: &Actor, username: &str) -> Result<(), UserError>;

    async fn me(&self, actor: &Actor) -> Result<UserDto, UserError>;

    /// Self-service edit. A submitted `role` is dropped unless the actor is an
    /// admin.
    async fn update_me(&self, actor: &Actor, request: UpdateUserRequest)
    -> Result<UserDto, UserError>;
}
