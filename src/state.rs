use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::catalog::{CatalogStore, PgCatalogStore};
use crate::config::AppConfig;
use crate::plan::{EngineSettings, PgPlanStore, PgRotationStore, PlanEngine};
use crate::profile::{PgProfileStore, ProfileStore};
use crate::shopping::{PgShoppingListStore, ShoppingListStore};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn CatalogStore>,
    pub catalog_admin: Arc<PgCatalogStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub shopping: Arc<dyn ShoppingListStore>,
    pub engine: Arc<PlanEngine>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        let catalog_admin = Arc::new(PgCatalogStore::new(db.clone()));
        let catalog: Arc<dyn CatalogStore> = catalog_admin.clone();
        let profiles: Arc<dyn ProfileStore> = Arc::new(PgProfileStore::new(db.clone()));
        let shopping: Arc<dyn ShoppingListStore> = Arc::new(PgShoppingListStore::new(db.clone()));
        let engine = Arc::new(PlanEngine::new(
            catalog.clone(),
            Arc::new(PgPlanStore::new(db.clone())),
            Arc::new(PgRotationStore::new(db.clone())),
            EngineSettings {
                strict_allergy_enforcement: config.engine.strict_allergy_enforcement,
                lookback_days: config.engine.rotation_lookback_days,
            },
        ));
        Self {
            db,
            config,
            catalog,
            catalog_admin,
            profiles,
            shopping,
            engine,
        }
    }
}
