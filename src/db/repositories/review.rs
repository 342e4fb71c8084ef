use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, TryIntoModel,
};

use super::{WriteOutcome, is_unique_violation, now_rfc3339};
use crate::entities::{comments, prelude::*, reviews};

pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Looks a review up only if it belongs to the given title.
    pub async fn get_for_title(&self, title_id: i32, id: i32) -> Result<Option<reviews::Model>> {
        Reviews::find_by_id(id)
            .filter(reviews::Column::TitleId.eq(title_id))
            .one(&self.conn)
            .await
            .context("Failed to query review")
    }

    pub async fn list_for_title(
        &self,
        title_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<reviews::Model>, u64)> {
        let query = Reviews::find().filter(reviews::Column::TitleId.eq(title_id));

        let total = query.clone().count(&self.conn).await?;
        let rows = query
            .order_by_asc(reviews::Column::PubDate)
            .order_by_asc(reviews::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list reviews")?;

        Ok((rows, total))
    }

    /// Inserts a review. A second review by the same author on the same title
    /// yields [`WriteOutcome::Duplicate`], whether caught by the pre-check or
    /// by the unique index when two requests race.
    pub async fn create(
        &self,
        author_id: i32,
        title_id: i32,
        text: String,
        score: i32,
    ) -> Result<WriteOutcome<reviews::Model>> {
        let txn = self.conn.begin().await?;

        let existing = Reviews::find()
            .filter(reviews::Column::AuthorId.eq(author_id))
            .filter(reviews::Column::TitleId.eq(title_id))
            .count(&txn)
            .await?;
        if existing > 0 {
            return Ok(WriteOutcome::Duplicate);
        }

        let result = reviews::ActiveModel {
            author_id: Set(author_id),
            title_id: Set(title_id),
            text: Set(text),
            score: Set(score),
            pub_date: Set(now_rfc3339()),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        match result {
            Ok(model) => {
                txn.commit().await?;
                Ok(WriteOutcome::Written(model))
            }
            Err(e) if is_unique_violation(&e) => Ok(WriteOutcome::Duplicate),
            Err(e) => Err(e).context("Failed to insert review"),
        }
    }

    pub async fn update(
        &self,
        review: reviews::Model,
        text: Option<String>,
        score: Option<i32>,
    ) -> Result<reviews::Model> {
        let mut active: reviews::ActiveModel = review.into();
        if let Some(text) = text {
            active.text = Set(text);
        }
        if let Some(score) = score {
            active.score = Set(score);
        }

        if !active.is_changed() {
            return active
                .try_into_model()
                .context("Failed to convert unchanged review");
        }

        active
            .update(&self.conn)
            .await
            .context("Failed to update review")
    }

    /// Deletes the review and every comment on it.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        Comments::delete_many()
            .filter(comments::Column::ReviewId.eq(id))
            .exec(&txn)
            .await?;

        let result = Reviews::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }
}
