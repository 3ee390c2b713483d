use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Base64-encoded HMAC signing secret.
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Root directory for stored mushroom images, one subdirectory per user.
    pub image_root: String,
    /// Base URL of the external AI classification service.
    pub model_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(2),
        };
        let image_root =
            std::env::var("IMAGE_ROOT").unwrap_or_else(|_| "data/mushroom_instances".into());
        let model_url =
            std::env::var("MODEL_URL").unwrap_or_else(|_| "http://localhost:5000".into());
        Ok(Self {
            database_url,
            jwt,
            image_root,
            model_url,
        })
    }
}
