use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{WriteOutcome, is_unique_violation};
use crate::entities::{categories, genres, prelude::*, title_genres, titles};

/// Categories and genres: flat `(name, slug)` reference data.
pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // Categories

    pub async fn list_categories(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<categories::Model>, u64)> {
        let mut query = Categories::find();
        if let Some(term) = search {
            query = query.filter(categories::Column::Name.contains(term));
        }

        let total = query.clone().count(&self.conn).await?;
        let rows = query
            .order_by_asc(categories::Column::Name)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list categories")?;

        Ok((rows, total))
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<categories::Model>> {
        Categories::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query category by slug")
    }

    pub async fn create_category(
        &self,
        name: String,
        slug: String,
    ) -> Result<WriteOutcome<categories::Model>> {
        let result = categories::ActiveModel {
            name: Set(name),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(&self.conn)
        .await;

        match result {
            Ok(model) => Ok(WriteOutcome::Written(model)),
            Err(e) if is_unique_violation(&e) => Ok(WriteOutcome::Duplicate),
            Err(e) => Err(e).context("Failed to insert category"),
        }
    }

    /// Titles in the category keep existing with no category.
    pub async fn delete_category(&self, slug: &str) -> Result<bool> {
        let Some(category) = self.get_category_by_slug(slug).await? else {
            return Ok(false);
        };

        let txn = self.conn.begin().await?;

        Titles::update_many()
            .col_expr(titles::Column::CategoryId, Expr::value(Option::<i32>::None))
            .filter(titles::Column::CategoryId.eq(category.id))
            .exec(&txn)
            .await?;

        Categories::delete_by_id(category.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    // Genres

    pub async fn list_genres(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<genres::Model>, u64)> {
        let mut query = Genres::find();
        if let Some(term) = search {
            query = query.filter(genres::Column::Name.contains(term));
        }

        let total = query.clone().count(&self.conn).await?;
        let rows = query
            .order_by_asc(genres::Column::Name)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list genres")?;

        Ok((rows, total))
    }

    pub async fn get_genre_by_slug(&self, slug: &str) -> Result<Option<genres::Model>> {
        Genres::find()
            .filter(genres::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query genre by slug")
    }

    pub async fn get_genres_by_slugs(&self, slugs: &[String]) -> Result<Vec<genres::Model>> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        Genres::find()
            .filter(genres::Column::Slug.is_in(slugs.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to query genres by slugs")
    }

    pub async fn create_genre(
        &self,
        name: String,
        slug: String,
    ) -> Result<WriteOutcome<genres::Model>> {
        let result = genres::ActiveModel {
            name: Set(name),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(&self.conn)
        .await;

        match result {
            Ok(model) => Ok(WriteOutcome::Written(model)),
            Err(e) if is_unique_violation(&e) => Ok(WriteOutcome::Duplicate),
            Err(e) => Err(e).context("Failed to insert genre"),
        }
    }

    /// Detaches the genre from every title, then removes it.
    pub async fn delete_genre(&self, slug: &str) -> Result<bool> {
        let Some(genre) = self.get_genre_by_slug(slug).await? else {
            return Ok(false);
        };

        let txn = self.conn.begin().await?;

        TitleGenres::delete_many()
            .filter(title_genres::Column::GenreId.eq(genre.id))
            .exec(&txn)
            .await?;

        Genres::delete_by_id(genre.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }
}
