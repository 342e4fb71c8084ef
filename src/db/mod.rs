use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{categories, comments, confirmation_codes, genres, reviews, titles, users};

pub mod migrator;
pub mod repositories;

pub use repositories::WriteOutcome;
pub use repositories::title::{NewTitle, TitleChanges, TitleFilter, TitleRecord};
pub use repositories::user::{NewUser, Registration, UserChanges};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Accept bare file paths as well as `sqlite:` URLs.
        let db_url = if db_url.starts_with("sqlite:") {
            db_url.to_string()
        } else {
            format!("sqlite:{db_url}")
        };
        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `:memory:` opens its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections.min(max_connections))
        };

        let mut opt = ConnectOptions::new(db_url.clone());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn confirmation_repo(&self) -> repositories::confirmation::ConfirmationRepository {
        repositories::confirmation::ConfirmationRepository::new(self.conn.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    fn title_repo(&self) -> repositories::title::TitleRepository {
        repositories::title::TitleRepository::new(self.conn.clone())
    }

    fn review_repo(&self) -> repositories::review::ReviewRepository {
        repositories::review::ReviewRepository::new(self.conn.clone())
    }

    fn comment_repo(&self) -> repositories::comment::CommentRepository {
        repositories::comment::CommentRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn get_user(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_username(username).await
    }

    /// Users keyed by ID, for resolving review and comment authors.
    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, users::Model>> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        Ok(self
            .user_repo()
            .get_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect())
    }

    pub async fn list_users(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<users::Model>, u64)> {
        self.user_repo().list(search, limit, offset).await
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<WriteOutcome<users::Model>> {
        self.user_repo().create(new_user).await
    }

    pub async fn register_user(&self, username: &str, email: &str) -> Result<Registration> {
        self.user_repo().register(username, email).await
    }

    pub async fn update_user(
        &self,
        user: users::Model,
        changes: UserChanges,
    ) -> Result<WriteOutcome<users::Model>> {
        self.user_repo().update(user, changes).await
    }

    pub async fn mark_user_confirmed(&self, id: i32) -> Result<()> {
        self.user_repo().mark_confirmed(id).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn upsert_superuser(
        &self,
        username: &str,
        email: &str,
    ) -> Result<WriteOutcome<users::Model>> {
        self.user_repo().upsert_superuser(username, email).await
    }

    // ========================================================================
    // Confirmation codes
    // ========================================================================

    pub async fn replace_confirmation_code(
        &self,
        user_id: i32,
        code_hash: String,
        issued_at: String,
        expires_at: String,
    ) -> Result<confirmation_codes::Model> {
        self.confirmation_repo()
            .replace(user_id, code_hash, issued_at, expires_at)
            .await
    }

    pub async fn get_confirmation_code(
        &self,
        user_id: i32,
    ) -> Result<Option<confirmation_codes::Model>> {
        self.confirmation_repo().get_for_user(user_id).await
    }

    pub async fn consume_confirmation_code(&self, id: i32, consumed_at: String) -> Result<bool> {
        self.confirmation_repo().consume(id, consumed_at).await
    }

    // ========================================================================
    // Categories & genres
    // ========================================================================

    pub async fn list_categories(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<categories::Model>, u64)> {
        self.catalog_repo().list_categories(search, limit, offset).await
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<categories::Model>> {
        self.catalog_repo().get_category_by_slug(slug).await
    }

    pub async fn create_category(
        &self,
        name: String,
        slug: String,
    ) -> Result<WriteOutcome<categories::Model>> {
        self.catalog_repo().create_category(name, slug).await
    }

    pub async fn delete_category(&self, slug: &str) -> Result<bool> {
        self.catalog_repo().delete_category(slug).await
    }

    pub async fn list_genres(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<genres::Model>, u64)> {
        self.catalog_repo().list_genres(search, limit, offset).await
    }

    pub async fn get_genres_by_slugs(&self, slugs: &[String]) -> Result<Vec<genres::Model>> {
        self.catalog_repo().get_genres_by_slugs(slugs).await
    }

    pub async fn create_genre(
        &self,
        name: String,
        slug: String,
    ) -> Result<WriteOutcome<genres::Model>> {
        self.catalog_repo().create_genre(name, slug).await
    }

    pub async fn delete_genre(&self, slug: &str) -> Result<bool> {
        self.catalog_repo().delete_genre(slug).await
    }

    // ========================================================================
    // Titles
    // ========================================================================

    pub async fn title_exists(&self, id: i32) -> Result<bool> {
        self.title_repo().exists(id).await
    }

    pub async fn get_title(&self, id: i32) -> Result<Option<TitleRecord>> {
        self.title_repo().get(id).await
    }

    pub async fn get_title_model(&self, id: i32) -> Result<Option<titles::Model>> {
        self.title_repo().get_model(id).await
    }

    pub async fn list_titles(
        &self,
        filter: &TitleFilter,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<TitleRecord>, u64)> {
        self.title_repo().list(filter, limit, offset).await
    }

    pub async fn create_title(&self, new_title: NewTitle) -> Result<TitleRecord> {
        self.title_repo().create(new_title).await
    }

    pub async fn update_title(
        &self,
        title: titles::Model,
        changes: TitleChanges,
    ) -> Result<TitleRecord> {
        self.title_repo().update(title, changes).await
    }

    pub async fn delete_title(&self, id: i32) -> Result<bool> {
        self.title_repo().delete(id).await
    }

    // ========================================================================
    // Reviews & comments
    // ========================================================================

    pub async fn get_review(&self, title_id: i32, id: i32) -> Result<Option<reviews::Model>> {
        self.review_repo().get_for_title(title_id, id).await
    }

    pub async fn list_reviews(
        &self,
        title_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<reviews::Model>, u64)> {
        self.review_repo().list_for_title(title_id, limit, offset).await
    }

    pub async fn create_review(
        &self,
        author_id: i32,
        title_id: i32,
        text: String,
        score: i32,
    ) -> Result<WriteOutcome<reviews::Model>> {
        self.review_repo()
            .create(author_id, title_id, text, score)
            .await
    }

    pub async fn update_review(
        &self,
        review: reviews::Model,
        text: Option<String>,
        score: Option<i32>,
    ) -> Result<reviews::Model> {
        self.review_repo().update(review, text, score).await
    }

    pub async fn delete_review(&self, id: i32) -> Result<bool> {
        self.review_repo().delete(id).await
    }

    pub async fn get_comment(&self, review_id: i32, id: i32) -> Result<Option<comments::Model>> {
        self.comment_repo().get_for_review(review_id, id).await
    }

    pub async fn list_comments(
        &self,
        review_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<comments::Model>, u64)> {
        self.comment_repo()
            .list_for_review(review_id, limit, offset)
            .await
    }

    pub async fn create_comment(
        &self,
        author_id: i32,
        review_id: i32,
        text: String,
    ) -> Result<comments::Model> {
        self.comment_repo().create(author_id, review_id, text).await
    }

    pub async fn update_comment(
        &self,
        comment: comments::Model,
        text: String,
    ) -> Result<comments::Model> {
        self.comment_repo().update_text(comment, text).await
    }

    pub async fn delete_comment(&self, id: i32) -> Result<bool> {
        self.comment_repo().delete(id).await
    }
}
