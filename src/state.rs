use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::images::store::{FsImageStore, ImageStore};
use crate::inference::{Classifier, ModelClient};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub images: Arc<dyn ImageStore>,
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let jwt = JwtKeys::from_config(&config.jwt);
        let images = Arc::new(FsImageStore::new(&config.image_root)) as Arc<dyn ImageStore>;
        let classifier = Arc::new(ModelClient::new(&config.model_url)) as Arc<dyn Classifier>;

        Ok(Self {
            db,
            config,
            jwt,
            images,
            classifier,
        })
    }

    #[cfg(test)]
    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        images: Arc<dyn ImageStore>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        Self {
            db,
            config,
            jwt,
            images,
            classifier,
        }
    }
}
