use models::{
    Comment, Like, Post, ProfileView, RepoSummary, UserView,
    payloads::{
        EducationRequest, ErrorsResponse, ExperienceRequest, LoginRequest, MessageResponse,
        ProfileRequest, RegisterRequest, TextRequest, TokenResponse,
    },
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

pub const TOKEN_HEADER: &str = "x-auth-token";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{status}: {}", .messages.join(", "))]
    Api { status: u16, messages: Vec<String> },
}

impl ApiError {
    /// Messages suitable for showing to a user.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiError::Http(e) => vec![e.to_string()],
            ApiError::Api { messages, .. } => messages.clone(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(e) => e.status().map(|status| status.as_u16()),
            ApiError::Api { status, .. } => Some(*status),
        }
    }
}

/// Reads either error envelope, falling back to the raw body.
pub fn parse_error_body(body: &str) -> Vec<String> {
    if let Ok(errors) = serde_json::from_str::<ErrorsResponse>(body) {
        return errors.errors.into_iter().map(|e| e.message).collect();
    }

    if let Ok(single) = serde_json::from_str::<MessageResponse>(body) {
        return vec![single.message];
    }

    vec![body.trim().to_string()]
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}/api{path}", self.base_url));

        match &self.token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await?;
        Err(ApiError::Api {
            status: status.as_u16(),
            messages: parse_error_body(&body),
        })
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, ApiError> {
        Self::decode(self.request(method, path).send().await?).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        Self::decode(self.request(method, path).json(body).send().await?).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<TokenResponse, ApiError> {
        self.send_json(Method::POST, "/users", request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ApiError> {
        self.send_json(Method::POST, "/auth", request).await
    }

    pub async fn current_user(&self) -> Result<UserView, ApiError> {
        self.send(Method::GET, "/auth").await
    }

    pub async fn posts(&self) -> Result<Vec<Post>, ApiError> {
        self.send(Method::GET, "/posts").await
    }

    pub async fn post(&self, id: Uuid) -> Result<Post, ApiError> {
        self.send(Method::GET, &format!("/posts/{id}")).await
    }

    pub async fn create_post(&self, text: &str) -> Result<Post, ApiError> {
        let body = TextRequest {
            text: text.to_string(),
        };
        self.send_json(Method::POST, "/posts", &body).await
    }

    pub async fn update_post(&self, id: Uuid, text: &str) -> Result<Post, ApiError> {
        let body = TextRequest {
            text: text.to_string(),
        };
        self.send_json(Method::PUT, &format!("/posts/{id}"), &body).await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<MessageResponse, ApiError> {
        self.send(Method::DELETE, &format!("/posts/{id}")).await
    }

    pub async fn like(&self, id: Uuid) -> Result<Vec<Like>, ApiError> {
        self.send(Method::PUT, &format!("/posts/like/{id}")).await
    }

    pub async fn unlike(&self, id: Uuid) -> Result<Vec<Like>, ApiError> {
        self.send(Method::PUT, &format!("/posts/unlike/{id}")).await
    }

    pub async fn add_comment(&self, id: Uuid, text: &str) -> Result<Vec<Comment>, ApiError> {
        let body = TextRequest {
            text: text.to_string(),
        };
        self.send_json(Method::POST, &format!("/posts/comment/{id}"), &body).await
    }

    pub async fn remove_comment(&self, id: Uuid, comment: Uuid) -> Result<Vec<Comment>, ApiError> {
        self.send(Method::DELETE, &format!("/posts/comment/{id}/{comment}")).await
    }

    pub async fn own_profile(&self) -> Result<ProfileView, ApiError> {
        self.send(Method::GET, "/profile/me").await
    }

    pub async fn profiles(&self) -> Result<Vec<ProfileView>, ApiError> {
        self.send(Method::GET, "/profile").await
    }

    pub async fn profile_by_user(&self, user: Uuid) -> Result<ProfileView, ApiError> {
        self.send(Method::GET, &format!("/profile/user/{user}")).await
    }

    pub async fn upsert_profile(&self, request: &ProfileRequest) -> Result<ProfileView, ApiError> {
        self.send_json(Method::POST, "/profile", request).await
    }

    pub async fn delete_account(&self) -> Result<MessageResponse, ApiError> {
        self.send(Method::DELETE, "/profile").await
    }

    pub async fn add_experience(
        &self,
        request: &ExperienceRequest,
    ) -> Result<ProfileView, ApiError> {
        self.send_json(Method::PUT, "/profile/experience", request).await
    }

    pub async fn remove_experience(&self, id: Uuid) -> Result<ProfileView, ApiError> {
        self.send(Method::DELETE, &format!("/profile/experience/{id}")).await
    }

    pub async fn add_education(&self, request: &EducationRequest) -> Result<ProfileView, ApiError> {
        self.send_json(Method::PUT, "/profile/education", request).await
    }

    pub async fn remove_education(&self, id: Uuid) -> Result<ProfileView, ApiError> {
        self.send(Method::DELETE, &format!("/profile/education/{id}")).await
    }

    pub async fn github_repos(&self, username: &str) -> Result<Vec<RepoSummary>, ApiError> {
        self.send(Method::GET, &format!("/profile/github/{username}")).await
    }
}
