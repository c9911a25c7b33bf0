//! # GitHub
//!
//! Read-only proxy for a profile's public repositories. The caller needs no
//! credentials, the server's own token (if any) is sent upstream. Any non-200
//! answer from GitHub is reported as "not found".
use models::RepoSummary;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::AppError;

const USER_AGENT: &str = concat!("devconnect/", env!("CARGO_PKG_VERSION"));
const REPO_LIMIT: u32 = 5;

pub struct GithubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().user_agent(USER_AGENT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub async fn fetch_repos(&self, username: &str) -> Result<Vec<RepoSummary>, AppError> {
        if !is_username(username) {
            return Err(AppError::Upstream);
        }

        let url = format!("{}/users/{username}/repos", self.base_url);
        let limit = REPO_LIMIT.to_string();

        let mut request = self
            .client
            .get(&url)
            .query(&[("per_page", limit.as_str()), ("sort", "created:asc")]);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(AppError::internal)?;

        if response.status() != StatusCode::OK {
            warn!("GitHub answered {} for {username}", response.status());
            return Err(AppError::Upstream);
        }

        let repos: Vec<RepoSummary> = response.json().await.map_err(AppError::internal)?;
        debug!("Fetched {} repos for {username}", repos.len());

        Ok(repos)
    }
}

/// GitHub logins are 1-39 alphanumerics or hyphens.
fn is_username(username: &str) -> bool {
    (1..=39).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}
