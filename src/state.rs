use crate::config::AppConfig;
use crate::db::Database;
use crate::meals::services::{RandomMealSource, TheMealDb};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub random_meals: Arc<dyn RandomMealSource>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = Database::from_config(&config.database)?;
        let random_meals = Arc::new(TheMealDb::new(&config.themealdb_url)) as Arc<dyn RandomMealSource>;

        Ok(Self::from_parts(db, config, random_meals))
    }

    pub fn from_parts(
        db: Database,
        config: Arc<AppConfig>,
        random_meals: Arc<dyn RandomMealSource>,
    ) -> Self {
        Self {
            db,
            config,
            random_meals,
        }
    }
}
