use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, CatalogService, SeaOrmAuthService, SeaOrmCatalogService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub catalog: Arc<dyn CatalogService>,

    pub auth: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(&config.general.database_path, &config.general).await?;
        Ok(Self::with_store(config, store))
    }

    /// Wires the services over an already-migrated store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let catalog = Arc::new(SeaOrmCatalogService::new(
            store.clone(),
            config.catalog.default_page_size,
        )) as Arc<dyn CatalogService>;

        let auth = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            catalog,
            auth,
        }
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
