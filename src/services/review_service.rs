//! Domain service for reviews and the comments under them.
//!
//! Every review is addressed through its title and every comment through its
//! review and title; a path whose parts don't belong together is reported as
//! not found.

use thiserror::Error;

use crate::api::types::{
    CommentDto, CommentRequest, CreateReviewRequest, Page, ReviewDto, UpdateReviewRequest,
};
use crate::domain::Actor;
use crate::domain::access::Denial;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("You have already reviewed this title")]
    DuplicateReview,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Denial> for ReviewError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => Self::Unauthorized,
            Denial::Forbidden => Self::Forbidden,
        }
    }
}

impl From<sea_orm::DbErr> for ReviewError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ReviewError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait ReviewService: Send + Sync {
    async fn list_reviews(
        &self,
        title_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<Page<ReviewDto>, ReviewError>;

    async fn get_review(&self, title_id: i32, review_id: i32) -> Result<ReviewDto, ReviewError>;

    /// # Errors
    ///
    /// - [`ReviewError::Validation`] for empty text or a score outside 1..=10
    /// - [`ReviewError::NotFound`] if the title does not exist
    /// - [`ReviewError::DuplicateReview`] if the actor already reviewed it
    async fn create_review(
        &self,
        actor: &Actor,
        title_id: i32,
        request: CreateReviewRequest,
    ) -> Result<ReviewDto, ReviewError>;

    async fn update_review(
        &self,
        actor: &Actor,
        title_id: i32,
        review_id: i32,
        request: UpdateReviewRequest,
    ) -> Result<ReviewDto, ReviewError>;

    /// Deletes the review and its comments.
    async fn delete_review(
        &self,
        actor: &Actor,
        title_id: i32,
        review_id: i32,
    ) -> Result<(), ReviewError>;

    async fn list_comments(
        &self,
        title_id: i32,
        review_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<Page<CommentDto>, ReviewError>;

    async fn get_comment(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<CommentDto, ReviewError>;

    async fn create_comment(
        &self,
        actor: &Actor,
        title_id: i32,
        review_id: i32,
        request: CommentRequest,
    ) -> Result<CommentDto, ReviewError>;

    async fn update_comment(
        &self,
        actor: &Actor,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
        request: CommentRequest,
    ) -> Result<CommentDto, ReviewError>;

    async fn delete_comment(
        &self,
        actor: &Actor,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<(), ReviewError>;
}
