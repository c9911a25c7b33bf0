use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use anyhow::{Context, anyhow};
use tracing::{info, warn};

/// Ten years. Longer lifetimes are rejected at startup.
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Redis,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreKind::Redis),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store backend {other:?}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub store: StoreKind,
    pub redis_url: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub github_api_url: String,
    pub github_token: Option<String>,
    pub cors_max_age: Duration,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            port: try_load("RUST_PORT", "5000")?,
            store: try_load("STORE_BACKEND", "redis")?,
            redis_url: try_load("REDIS_URL", "redis://redis:6379")?,
            jwt_secret: read_secret("JWT_SECRET")
                .context("JWT_SECRET must be provided as a secret or environment variable")?,
            token_ttl: token_ttl(try_load("TOKEN_TTL_SECS", "360000")?)?,
            github_api_url: try_load("GITHUB_API_URL", "https://api.github.com")?,
            github_token: read_secret("GITHUB_TOKEN").ok(),
            cors_max_age: Duration::from_secs(try_load("CORS_MAX_AGE_SECS", "3600")?),
        })
    }

    /// In-memory configuration for tests and local runs.
    pub fn local(jwt_secret: &str) -> Self {
        Self {
            port: 0,
            store: StoreKind::Memory,
            redis_url: String::new(),
            jwt_secret: jwt_secret.to_string(),
            token_ttl: Duration::from_secs(360000),
            github_api_url: "https://api.github.com".to_string(),
            github_token: None,
            cors_max_age: Duration::from_secs(3600),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value: {e}"))
}

fn token_ttl(secs: u64) -> anyhow::Result<Duration> {
    if secs == 0 || secs > MAX_TOKEN_TTL_SECS {
        return Err(anyhow!(
            "Invalid TOKEN_TTL_SECS value: {secs}, expected 1..={MAX_TOKEN_TTL_SECS}"
        ));
    }

    Ok(Duration::from_secs(secs))
}

fn non_blank(secret: String) -> Option<String> {
    let secret = secret.trim();

    (!secret.is_empty()).then(|| secret.to_string())
}

fn read_secret(secret_name: &str) -> anyhow::Result<String> {
    read_secret_in("/run/secrets", secret_name)
}

/// File first, then environment. Blank values count as missing.
fn read_secret_in(dir: &str, secret_name: &str) -> anyhow::Result<String> {
    let from_file = match read_to_string(format!("{dir}/{secret_name}")) {
        Ok(secret) => {
            let secret = non_blank(secret);
            if secret.is_none() {
                warn!("{secret_name} file is empty, trying environment");
            }
            secret
        }
        Err(e) => {
            warn!("Failed to read {secret_name} from file: {e}, trying environment");
            None
        }
    };

    from_file
        .or_else(|| var(secret_name).and_then(non_blank))
        .ok_or_else(|| anyhow!("{secret_name} not found"))
}
