use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::now_rfc3339;
use crate::entities::{comments, prelude::*};

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_for_review(&self, review_id: i32, id: i32) -> Result<Option<comments::Model>> {
        Comments::find_by_id(id)
            .filter(comments::Column::ReviewId.eq(review_id))
            .one(&self.conn)
            .await
            .context("Failed to query comment")
    }

    pub async fn list_for_review(
        &self,
        review_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<comments::Model>, u64)> {
        let query = Comments::find().filter(comments::Column::ReviewId.eq(review_id));

        let total = query.clone().count(&self.conn).await?;
        let rows = query
            .order_by_asc(comments::Column::PubDate)
            .order_by_asc(comments::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list comments")?;

        Ok((rows, total))
    }

    pub async fn create(
        &self,
        author_id: i32,
        review_id: i32,
        text: String,
    ) -> Result<comments::Model> {
        comments::ActiveModel {
            author_id: Set(author_id),
            review_id: Set(review_id),
            text: Set(text),
            pub_date: Set(now_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert comment")
    }

    pub async fn update_text(&self, comment: comments::Model, text: String) -> Result<comments::Model> {
        let mut active: comments::ActiveModel = comment.into();
        active.text = Set(text);
        active
            .update(&self.conn)
            .await
            .context("Failed to update comment")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Comments::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete comment")?;
        Ok(result.rows_affected > 0)
    }
}
