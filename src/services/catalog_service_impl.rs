//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use chrono::Datelike;
use std::collections::BTreeSet;
use tracing::info;

use crate::api::types::{
    CatalogEntryRequest, CategoryDto, CreateTitleRequest, GenreDto, Page, TitleDto,
    UpdateTitleRequest,
};
use crate::db::{NewTitle, Store, TitleChanges, TitleFilter, WriteOutcome};
use crate::domain::access::{Action, Resource, authorize};
use crate::domain::{Actor, validation};
use crate::services::catalog_service::{CatalogError, CatalogService};

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn resolve_category(&self, slug: &str) -> Result<i32, CatalogError> {
        self.store
            .get_category_by_slug(slug)
            .await?
            .map(|c| c.id)
            .ok_or_else(|| CatalogError::Validation(format!("Unknown category '{slug}'")))
    }

    async fn resolve_genres(&self, slugs: &[String]) -> Result<Vec<i32>, CatalogError> {
        let wanted: BTreeSet<&str> = slugs.iter().map(String::as_str).collect();
        let found = self.store.get_genres_by_slugs(slugs).await?;

        let missing: Vec<&str> = wanted
            .iter()
            .filter(|slug| !found.iter().any(|g| g.slug == **slug))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::Validation(format!(
                "Unknown genre(s): {}",
                missing.join(", ")
            )));
        }

        Ok(found.into_iter().map(|g| g.id).collect())
    }
}

fn validate_entry(request: &CatalogEntryRequest) -> Result<(), CatalogError> {
    validation::catalog_name(&request.name).map_err(CatalogError::Validation)?;
    validation::slug(&request.slug).map_err(CatalogError::Validation)?;
    Ok(())
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_categories(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Page<CategoryDto>, CatalogError> {
        let (rows, count) = self.store.list_categories(search, limit, offset).await?;
        Ok(Page::new(
            rows.into_iter().map(CategoryDto::from).collect(),
            count,
        ))
    }

    async fn create_category(
        &self,
        actor: &Actor,
        request: CatalogEntryRequest,
    ) -> Result<CategoryDto, CatalogError> {
        authorize(actor, Action::Create, Resource::Category)?;
        validate_entry(&request)?;

        let slug = request.slug.clone();
        match self.store.create_category(request.name, request.slug).await? {
            WriteOutcome::Written(category) => {
                info!(event = "category_created", slug = %category.slug, "Category created");
                Ok(category.into())
            }
            WriteOutcome::Duplicate => Err(CatalogError::Validation(format!(
                "Category with slug '{slug}' already exists"
            ))),
        }
    }

    async fn delete_category(&self, actor: &Actor, slug: &str) -> Result<(), CatalogError> {
        authorize(actor, Action::Delete, Resource::Category)?;

        if !self.store.delete_category(slug).await? {
            return Err(CatalogError::NotFound(format!("Category '{slug}'")));
        }
        info!(event = "category_deleted", slug = %slug, "Category deleted");
        Ok(())
    }

    async fn list_genres(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Page<GenreDto>, CatalogError> {
        let (rows, count) = self.store.list_genres(search, limit, offset).await?;
        Ok(Page::new(rows.into_iter().map(GenreDto::from).collect(), count))
    }

    async fn create_genre(
        &self,
        actor: &Actor,
        request: CatalogEntryRequest,
    ) -> Result<GenreDto, CatalogError> {
        authorize(actor, Action::Create, Resource::Genre)?;
        validate_entry(&request)?;

        let slug = request.slug.clone();
        match self.store.create_genre(request.name, request.slug).await? {
            WriteOutcome::Written(genre) => {
                info!(event = "genre_created", slug = %genre.slug, "Genre created");
                Ok(genre.into())
            }
            WriteOutcome::Duplicate => Err(CatalogError::Validation(format!(
                "Genre with slug '{slug}' already exists"
            ))),
        }
    }

    async fn delete_genre(&self, actor: &Actor, slug: &str) -> Result<(), CatalogError> {
        authorize(actor, Action::Delete, Resource::Genre)?;

        if !self.store.delete_genre(slug).await? {
            return Err(CatalogError::NotFound(format!("Genre '{slug}'")));
        }
        info!(event = "genre_deleted", slug = %slug, "Genre deleted");
        Ok(())
    }

    async fn list_titles(
        &self,
        filter: &TitleFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Page<TitleDto>, CatalogError> {
        let (records, count) = self.store.list_titles(filter, limit, offset).await?;
        Ok(Page::new(
            records.into_iter().map(TitleDto::from).collect(),
            count,
        ))
    }

    async fn get_title(&self, id: i32) -> Result<TitleDto, CatalogError> {
        self.store
            .get_title(id)
            .await?
            .map(TitleDto::from)
            .ok_or_else(|| CatalogError::NotFound(format!("Title {id}")))
    }

    async fn create_title(
        &self,
        actor: &Actor,
        request: CreateTitleRequest,
    ) -> Result<TitleDto, CatalogError> {
        authorize(actor, Action::Create, Resource::Title)?;

        validation::catalog_name(&request.name).map_err(CatalogError::Validation)?;
        let year = request
            .year
            .ok_or_else(|| CatalogError::Validation("year is required".to_string()))?;
        validation::year(year, current_year()).map_err(CatalogError::Validation)?;

        let category_id = match &request.category {
            Some(slug) => Some(self.resolve_category(slug).await?),
            None => None,
        };
        let genre_ids = self.resolve_genres(&request.genre).await?;

        let record = self
            .store
            .create_title(NewTitle {
                name: request.name,
                year,
                description: request.description,
                category_id,
                genre_ids,
            })
            .await?;

        info!(event = "title_created", title_id = record.title.id, "Title created");
        Ok(record.into())
    }

    async fn update_title(
        &self,
        actor: &Actor,
        id: i32,
        request: UpdateTitleRequest,
    ) -> Result<TitleDto, CatalogError> {
        authorize(actor, Action::Update, Resource::Title)?;

        if let Some(name) = &request.name {
            validation::catalog_name(name).map_err(CatalogError::Validation)?;
        }
        if let Some(year) = request.year {
            validation::year(year, current_year()).map_err(CatalogError::Validation)?;
        }

        let title = self
            .store
            .get_title_model(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Title {id}")))?;

        let category_id = match &request.category {
            Some(Some(slug)) => Some(Some(self.resolve_category(slug).await?)),
            Some(None) => Some(None),
            None => None,
        };
        let genre_ids = match &request.genre {
            Some(slugs) => Some(self.resolve_genres(slugs).await?),
            None => None,
        };

        let record = self
            .store
            .update_title(
                title,
                TitleChanges {
                    name: request.name,
                    year: request.year,
                    description: request.description,
                    category_id,
                    genre_ids,
                },
            )
            .await?;

        Ok(record.into())
    }

    async fn delete_title(&self, actor: &Actor, id: i32) -> Result<(), CatalogError> {
        authorize(actor, Action::Delete, Resource::Title)?;

        if !self.store.delete_title(id).await? {
            return Err(CatalogError::NotFound(format!("Title {id}")));
        }
        info!(event = "title_deleted", title_id = id, "Title deleted");
        Ok(())
    }
}
