use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

use crate::domain::rating::rating_from;
use crate::entities::{categories, comments, genres, prelude::*, reviews, title_genres, titles};

#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Substring of the name.
    pub name: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub genre_ids: Vec<i32>,
}

/// Partial update. The nested options distinguish "leave alone" from
/// "clear".
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<i32>>,
    pub genre_ids: Option<Vec<i32>>,
}

/// A title with its category, genres and derived rating.
#[derive(Debug, Clone)]
pub struct TitleRecord {
    pub title: titles::Model,
    pub category: Option<categories::Model>,
    pub genres: Vec<genres::Model>,
    pub rating: Option<i32>,
}

pub struct TitleRepository {
    conn: DatabaseConnection,
}

impl TitleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        let count = Titles::find()
            .filter(titles::Column::Id.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to check title existence")?;
        Ok(count > 0)
    }

    pub async fn get_model(&self, id: i32) -> Result<Option<titles::Model>> {
        Titles::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query title by ID")
    }

    pub async fn get(&self, id: i32) -> Result<Option<TitleRecord>> {
        let Some(model) = self.get_model(id).await? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![model]).await?.pop())
    }

    pub async fn list(
        &self,
        filter: &TitleFilter,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<TitleRecord>, u64)> {
        let mut query = Titles::find();

        if let Some(slug) = &filter.category {
            query = query.filter(
                titles::Column::CategoryId.in_subquery(
                    Query::select()
                        .column(categories::Column::Id)
                        .from(Categories)
                        .and_where(categories::Column::Slug.eq(slug.as_str()))
                        .to_owned(),
                ),
            );
        }

        if let Some(slug) = &filter.genre {
            query = query.filter(
                titles::Column::Id.in_subquery(
                    Query::select()
                        .column((TitleGenres, title_genres::Column::TitleId))
                        .from(TitleGenres)
                        .inner_join(
                            Genres,
                            Expr::col((Genres, genres::Column::Id))
                                .equals((TitleGenres, title_genres::Column::GenreId)),
                        )
                        .and_where(genres::Column::Slug.eq(slug.as_str()))
                        .to_owned(),
                ),
            );
        }

        if let Some(name) = &filter.name {
            query = query.filter(titles::Column::Name.contains(name.as_str()));
        }

        if let Some(year) = filter.year {
            query = query.filter(titles::Column::Year.eq(year));
        }

        let total = query.clone().count(&self.conn).await?;
        let models = query
            .order_by_asc(titles::Column::Name)
            .order_by_asc(titles::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list titles")?;

        Ok((self.hydrate(models).await?, total))
    }

    pub async fn create(&self, new_title: NewTitle) -> Result<TitleRecord> {
        let txn = self.conn.begin().await?;

        let model = titles::ActiveModel {
            name: Set(new_title.name),
            year: Set(new_title.year),
            description: Set(new_title.description),
            category_id: Set(new_title.category_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert title")?;

        link_genres(&txn, model.id, new_title.genre_ids).await?;

        txn.commit().await?;

        self.get(model.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created title"))
    }

    pub async fn update(&self, title: titles::Model, changes: TitleChanges) -> Result<TitleRecord> {
        let id = title.id;
        let txn = self.conn.begin().await?;

        let mut active: titles::ActiveModel = title.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(category_id);
        }
        if active.is_changed() {
            active.update(&txn).await.context("Failed to update title")?;
        }

        if let Some(genre_ids) = changes.genre_ids {
            TitleGenres::delete_many()
                .filter(title_genres::Column::TitleId.eq(id))
                .exec(&txn)
                .await?;
            link_genres(&txn, id, genre_ids).await?;
        }

        txn.commit().await?;

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Title {id} vanished during update"))
    }

    /// Deletes the title with its reviews, their comments and genre links.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let review_ids: Vec<i32> = Reviews::find()
            .select_only()
            .column(reviews::Column::Id)
            .filter(reviews::Column::TitleId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        Comments::delete_many()
            .filter(comments::Column::ReviewId.is_in(review_ids))
            .exec(&txn)
            .await?;

        Reviews::delete_many()
            .filter(reviews::Column::TitleId.eq(id))
            .exec(&txn)
            .await?;

        TitleGenres::delete_many()
            .filter(title_genres::Column::TitleId.eq(id))
            .exec(&txn)
            .await?;

        let result = Titles::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn hydrate(&self, models: Vec<titles::Model>) -> Result<Vec<TitleRecord>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = models.iter().map(|t| t.id).collect();
        let category_ids: Vec<i32> = models.iter().filter_map(|t| t.category_id).collect();

        let categories: HashMap<i32, categories::Model> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            Categories::find()
                .filter(categories::Column::Id.is_in(category_ids))
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        let links = TitleGenres::find()
            .find_also_related(Genres)
            .filter(title_genres::Column::TitleId.is_in(ids.clone()))
            .order_by_asc(genres::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to load title genres")?;

        let mut genres_by_title: HashMap<i32, Vec<genres::Model>> = HashMap::new();
        for (link, genre) in links {
            if let Some(genre) = genre {
                genres_by_title.entry(link.title_id).or_default().push(genre);
            }
        }

        let ratings = self.ratings_for(&ids).await?;

        Ok(models
            .into_iter()
            .map(|title| TitleRecord {
                category: title.category_id.and_then(|id| categories.get(&id).cloned()),
                genres: genres_by_title.remove(&title.id).unwrap_or_default(),
                rating: ratings.get(&title.id).copied(),
                title,
            })
            .collect())
    }

    /// Current rating per title, computed from the reviews on every call.
    async fn ratings_for(&self, title_ids: &[i32]) -> Result<HashMap<i32, i32>> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let totals: Vec<(i32, i64, i64)> = Reviews::find()
            .select_only()
            .column(reviews::Column::TitleId)
            .column_as(reviews::Column::Score.sum(), "total")
            .column_as(reviews::Column::Id.count(), "count")
            .filter(reviews::Column::TitleId.is_in(title_ids.to_vec()))
            .group_by(reviews::Column::TitleId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to aggregate review scores")?;

        Ok(totals
            .into_iter()
            .filter_map(|(title_id, total, count)| {
                rating_from(total, count).map(|rating| (title_id, rating))
            })
            .collect())
    }
}

async fn link_genres<C: ConnectionTrait>(
    db: &C,
    title_id: i32,
    mut genre_ids: Vec<i32>,
) -> Result<()> {
    genre_ids.sort_unstable();
    genre_ids.dedup();
    if genre_ids.is_empty() {
        return Ok(());
    }

    let links: Vec<title_genres::ActiveModel> = genre_ids
        .into_iter()
        .map(|genre_id| title_genres::ActiveModel {
            title_id: Set(title_id),
            genre_id: Set(genre_id),
        })
        .collect();

    TitleGenres::insert_many(links)
        .exec_without_returning(db)
        .await
        .context("Failed to link genres")?;

    Ok(())
}
