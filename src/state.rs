use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::Config;
use crate::db::Store;
use crate::services::notifier::{self, Notifier};
use crate::services::token::{TokenIssuer, ephemeral_secret};
use crate::services::{
    AuthService, CatalogService, ReviewService, SeaOrmAuthService, SeaOrmCatalogService,
    SeaOrmReviewService, SeaOrmUserService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub notifier: Arc<dyn Notifier>,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub review_service: Arc<dyn ReviewService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let notifier = notifier::from_config(&config.mail);
        Self::with_notifier(config, notifier).await
    }

    /// Builds the state around a caller-supplied mail backend.
    pub async fn with_notifier(
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let secret = if config.auth.jwt_secret.is_empty() {
            warn!(
                "No JWT secret configured (auth.jwt_secret or {}); tokens will not survive a restart",
                crate::config::JWT_SECRET_ENV
            );
            ephemeral_secret()
        } else {
            config.auth.jwt_secret.clone()
        };
        let tokens = TokenIssuer::new(secret.as_bytes(), config.auth.access_token_ttl_minutes);

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            notifier.clone(),
            tokens,
            config.auth.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let user_service = Arc::new(SeaOrmUserService::new(store.clone()))
            as Arc<dyn UserService + Send + Sync + 'static>;

        let catalog_service = Arc::new(SeaOrmCatalogService::new(store.clone()))
            as Arc<dyn CatalogService + Send + Sync + 'static>;

        let review_service = Arc::new(SeaOrmReviewService::new(store.clone()))
            as Arc<dyn ReviewService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            notifier,
            auth_service,
            user_service,
            catalog_service,
            review_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
