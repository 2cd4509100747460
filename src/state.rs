use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    auth::{session, SessionCodec, UserStore},
    config::AppConfig,
    db,
    views::Views,
    weights::WeightStore,
};

pub const SITE_NAME: &str = "Weight Tracker";

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub users: UserStore,
    pub weights: WeightStore,
    pub sessions: Arc<dyn SessionCodec>,
    pub views: Arc<Views>,
}

impl AppState {
    /// Opens and migrates the database; any failure here aborts startup.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config.database_path).await?;
        db::migrate(&db).await?;
        let sessions = session::codec_from_config(&config.session)?;
        Ok(Self::from_parts(db, Arc::new(config), sessions))
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        sessions: Arc<dyn SessionCodec>,
    ) -> Self {
        Self {
            users: UserStore::new(db.clone()),
            weights: WeightStore::new(db.clone()),
            db,
            config,
            sessions,
            views: Arc::new(Views::new(SITE_NAME)),
        }
    }

    /// Default config, legacy sessions, fresh in-memory database.
    #[cfg(test)]
    pub async fn fake() -> Self {
        let config = AppConfig::from_lookup(|_| None).expect("default config");
        Self::from_parts(
            db::memory_pool().await,
            Arc::new(config),
            Arc::new(session::LegacySessionCodec),
        )
    }
}
