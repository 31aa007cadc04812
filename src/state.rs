use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::auth::{
    jwt::TokenIssuer,
    password::PasswordHasher,
    repo::PgUserRepository,
    service::CredentialService,
};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub service: CredentialService,
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
        let repo = Arc::new(PgUserRepository::new(db.clone()));
        let service = CredentialService::new(
            repo,
            PasswordHasher::default(),
            TokenIssuer::from_config(&config.auth),
            config.auth.offload_hashing,
        );
        Self {
            db,
            config,
            service,
        }
    }
}
