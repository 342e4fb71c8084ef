//! Domain service for the catalog: categories, genres and titles.

use thiserror::Error;

use crate::api::types::{
    CatalogEntryRequest, CategoryDto, CreateTitleRequest, GenreDto, Page, TitleDto,
    UpdateTitleRequest,
};
use crate::db::TitleFilter;
use crate::domain::Actor;
use crate::domain::access::Denial;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
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

impl From<Denial> for CatalogError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => Self::Unauthorized,
            Denial::Forbidden => Self::Forbidden,
        }
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Catalog operations. Reads are public; every write requires an admin.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_categories(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Page<CategoryDto>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] if the slug is malformed or taken.
    async fn create_category(
        &self,
        actor: &Actor,
        request: CatalogEntryRequest,
    ) -> Result<CategoryDto, CatalogError>;

    /// Titles in the deleted category are kept with no category.
    async fn delete_category(&self, actor: &Actor, slug: &str) -> Result<(), CatalogError>;

    async fn list_genres(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Page<GenreDto>, CatalogError>;

    async fn create_genre(
        &self,
        actor: &Actor,
        request: CatalogEntryRequest,
    ) -> Result<GenreDto, CatalogError>;

    async fn delete_genre(&self, actor: &Actor, slug: &str) -> Result<(), CatalogError>;

    /// Titles ordered by name.
    async fn list_titles(
        &self,
        filter: &TitleFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Page<TitleDto>, CatalogError>;

    async fn get_title(&self, id: i32) -> Result<TitleDto, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] for an out-of-range year or an
    /// unknown category/genre slug.
    async fn create_title(
        &self,
        actor: &Actor,
        request: CreateTitleRequest,
    ) -> Result<TitleDto, CatalogError>;

    async fn update_title(
        &self,
        actor: &Actor,
        id: i32,
        request: UpdateTitleRequest,
    ) -> Result<TitleDto, CatalogError>;

    /// Deletes the title along with its reviews and their comments.
    async fn delete_title(&self, actor: &Actor, id: i32) -> Result<(), CatalogError>;
}
