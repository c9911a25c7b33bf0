use std::sync::Arc;

use tracing::{info, warn};

use super::{
    auth::TokenIssuer,
    config::{Config, StoreKind},
    database::{Database, RedisBackend, init_redis},
    github::GithubClient,
};

pub struct State {
    pub config: Config,
    pub db: Database,
    pub tokens: TokenIssuer,
    pub github: GithubClient,
}

impl State {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let db = match config.store {
            StoreKind::Redis => {
                let connection = init_redis(&config.redis_url).await?;
                Database::new(Arc::new(RedisBackend::new(connection)))
            }
            StoreKind::Memory => {
                warn!("Using in-memory store, data is lost on restart");
                Database::memory()
            }
        };

        Self::with_database(config, db)
    }

    pub fn with_database(config: Config, db: Database) -> anyhow::Result<Arc<Self>> {
        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl);
        let github = GithubClient::new(&config.github_api_url, config.github_token.clone())?;

        info!("Token lifetime: {}s", config.token_ttl.as_secs());

        Ok(Arc::new(Self {
            config,
            db,
            tokens,
            github,
        }))
    }
}
