//! `SeaORM` implementation of the `ReviewService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::api::types::{
    CommentDto, CommentRequest, CreateReviewRequest, Page, ReviewDto, UpdateReviewRequest,
};
use crate::db::{Store, WriteOutcome};
use crate::domain::access::{Action, Resource, authorize};
use crate::domain::{Actor, validation};
use crate::entities::{comments, reviews};
use crate::services::review_service::{ReviewError, ReviewService};

pub struct SeaOrmReviewService {
    store: Store,
}

impl SeaOrmReviewService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_title(&self, title_id: i32) -> Result<(), ReviewError> {
        if self.store.title_exists(title_id).await? {
            Ok(())
        } else {
            Err(ReviewError::NotFound(format!("Title {title_id}")))
        }
    }

    async fn find_review(&self, title_id: i32, review_id: i32) -> Result<reviews::Model, ReviewError> {
        self.store
            .get_review(title_id, review_id)
            .await?
            .ok_or_else(|| ReviewError::NotFound(format!("Review {review_id}")))
    }

    async fn find_comment(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<comments::Model, ReviewError> {
        self.find_review(title_id, review_id).await?;
        self.store
            .get_comment(review_id, comment_id)
            .await?
            .ok_or_else(|| ReviewError::NotFound(format!("Comment {comment_id}")))
    }

    async fn author_name(&self, author_id: i32) -> Result<String, ReviewError> {
        Ok(self
            .store
            .get_user(author_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_default())
    }

    async fn review_dto(&self, review: reviews::Model) -> Result<ReviewDto, ReviewError> {
        let author = self.author_name(review.author_id).await?;
        Ok(review_to_dto(review, author))
    }

    async fn comment_dto(&self, comment: comments::Model) -> Result<CommentDto, ReviewError> {
        let author = self.author_name(comment.author_id).await?;
        Ok(comment_to_dto(comment, author))
    }
}

fn review_to_dto(review: reviews::Model, author: String) -> ReviewDto {
    ReviewDto {
        id: review.id,
        text: review.text,
        author,
        score: review.score,
        pub_date: review.pub_date,
    }
}

fn comment_to_dto(comment: comments::Model, author: String) -> CommentDto {
    CommentDto {
        id: comment.id,
        text: comment.text,
        author,
        pub_date: comment.pub_date,
    }
}

/// Anonymous writes are refused before anything is looked up.
fn require_authenticated(actor: &Actor) -> Result<(), ReviewError> {
    if actor.is_authenticated() {
        Ok(())
    } else {
        Err(ReviewError::Unauthorized)
    }
}

#[async_trait]
impl ReviewService for SeaOrmReviewService {
    async fn list_reviews(
        &self,
        title_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<Page<ReviewDto>, ReviewError> {
        self.ensure_title(title_id).await?;

        let (rows, count) = self.store.list_reviews(title_id, limit, offset).await?;
        let author_ids: Vec<i32> = rows.iter().map(|r| r.author_id).collect();
        let authors = self.store.get_users_by_ids(&author_ids).await?;

        let results = rows
            .into_iter()
            .map(|review| {
                let author = authors
                    .get(&review.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default();
                review_to_dto(review, author)
            })
            .collect();

        Ok(Page::new(results, count))
    }

    async fn get_review(&self, title_id: i32, review_id: i32) -> Result<ReviewDto, ReviewError> {
        let review = self.find_review(title_id, review_id).await?;
        self.review_dto(review).await
    }

    async fn create_review(
        &self,
        actor: &Actor,
        title_id: i32,
        request: CreateReviewRequest,
    ) -> Result<ReviewDto, ReviewError> {
        authorize(actor, Action::Create, Resource::Review { author_id: None })?;
        let author_id = actor.user_id().ok_or(ReviewError::Unauthorized)?;

        validation::text("text", &request.text).map_err(ReviewError::Validation)?;
        let score = request
            .score
            .ok_or_else(|| ReviewError::Validation("score is required".to_string()))?;
        validation::score(score).map_err(ReviewError::Validation)?;

        self.ensure_title(title_id).await?;

        let review = match self
            .store
            .create_review(author_id, title_id, request.text, score)
            .await?
        {
            WriteOutcome::Written(review) => review,
            WriteOutcome::Duplicate => return Err(ReviewError::DuplicateReview),
        };

        metrics::counter!("reviews_created_total").increment(1);
        info!(
            event = "review_created",
            review_id = review.id,
            title_id = title_id,
            author_id = author_id,
            "Review created"
        );

        self.review_dto(review).await
    }

    async fn update_review(
        &self,
        actor: &Actor,
        title_id: i32,
        review_id: i32,
        request: UpdateReviewRequest,
    ) -> Result<ReviewDto, ReviewError> {
        require_authenticated(actor)?;

        let review = self.find_review(title_id, review_id).await?;
        authorize(
            actor,
            Action::Update,
            Resource::Review {
                author_id: Some(review.author_id),
            },
        )?;

        if let Some(text) = &request.text {
            validation::text("text", text).map_err(ReviewError::Validation)?;
        }
        if let Some(score) = request.score {
            validation::score(score).map_err(ReviewError::Validation)?;
        }

        let review = self
            .store
            .update_review(review, request.text, request.score)
            .await?;
        self.review_dto(review).await
    }

    async fn delete_review(
        &self,
        actor: &Actor,
        title_id: i32,
        review_id: i32,
    ) -> Result<(), ReviewError> {
        require_authenticated(actor)?;

        let review = self.find_review(title_id, review_id).await?;
        authorize(
            actor,
            Action::Delete,
            Resource::Review {
                author_id: Some(review.author_id),
            },
        )?;

        self.store.delete_review(review.id).await?;
        info!(event = "review_deleted", review_id = review.id, actor_id = ?actor.user_id(), "Review deleted");
        Ok(())
    }

    async fn list_comments(
        &self,
        title_id: i32,
        review_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<Page<CommentDto>, ReviewError> {
        self.find_review(title_id, review_id).await?;

        let (rows, count) = self.store.list_comments(review_id, limit, offset).await?;
        let author_ids: Vec<i32> = rows.iter().map(|c| c.author_id).collect();
        let authors = self.store.get_users_by_ids(&author_ids).await?;

        let results = rows
            .into_iter()
            .map(|comment| {
                let author = authors
                    .get(&comment.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default();
                comment_to_dto(comment, author)
            })
            .collect();

        Ok(Page::new(results, count))
    }

    async fn get_comment(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<CommentDto, ReviewError> {
        let comment = self.find_comment(title_id, review_id, comment_id).await?;
        self.comment_dto(comment).await
    }

    async fn create_comment(
        &self,
        actor: &Actor,
        title_id: i32,
        review_id: i32,
        request: CommentRequest,
    ) -> Result<CommentDto, ReviewError> {
        authorize(actor, Action::Create, Resource::Comment { author_id: None })?;
        let author_id = actor.user_id().ok_or(ReviewError::Unauthorized)?;

        validation::text("text", &request.text).map_err(ReviewError::Validation)?;

        let review = self.find_review(title_id, review_id).await?;
        let comment = self
            .store
            .create_comment(author_id, review.id, request.text)
            .await?;

        info!(event = "comment_created", comment_id = comment.id, review_id = review.id, "Comment created");
        self.comment_dto(comment).await
    }

    async fn update_comment(
        &self,
        actor: &Actor,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
        request: CommentRequest,
    ) -> Result<CommentDto, ReviewError> {
        require_authenticated(actor)?;

        let comment = self.find_comment(title_id, review_id, comment_id).await?;
        authorize(
            actor,
            Action::Update,
            Resource::Comment {
                author_id: Some(comment.author_id),
            },
        )?;

        validation::text("text", &request.text).map_err(ReviewError::Validation)?;

        let comment = self.store.update_comment(comment, request.text).await?;
        self.comment_dto(comment).await
    }

    async fn delete_comment(
        &self,
        actor: &Actor,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<(), ReviewError> {
        require_authenticated(actor)?;

        let comment = self.find_comment(title_id, review_id, comment_id).await?;
        authorize(
            actor,
            Action::Delete,
            Resource::Comment {
                author_id: Some(comment.author_id),
            },
        )?;

        self.store.delete_comment(comment.id).await?;
        Ok(())
    }
}
