use std::{mem, sync::Arc, time::Duration};

use models::payloads::{
    EducationRequest, ExperienceRequest, LoginRequest, ProfileRequest, RegisterRequest,
};
use tokio::{sync::RwLock, time::sleep};
use tracing::debug;
use uuid::Uuid;

use crate::{
    api::{ApiClient, ApiError},
    reducers::{Action, Alert, AlertKind, AppState, RequestError, reduce},
};

pub const ALERT_TIMEOUT: Duration = Duration::from_secs(5);

fn request_error(error: &ApiError) -> RequestError {
    RequestError {
        message: error.messages().join(", "),
        status: error.status(),
    }
}

/// Shared state container. Every change goes through [`Store::dispatch`].
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<AppState>>,
    api: Arc<RwLock<ApiClient>>,
    alert_timeout: Duration,
}

impl Store {
    pub fn new(api: ApiClient) -> Self {
        Self {
            state: Arc::default(),
            api: Arc::new(RwLock::new(api)),
            alert_timeout: ALERT_TIMEOUT,
        }
    }

    pub fn with_alert_timeout(mut self, timeout: Duration) -> Self {
        self.alert_timeout = timeout;
        self
    }

    pub async fn state(&self) -> AppState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, action: Action) {
        debug!(?action, "dispatch");

        let mut state = self.state.write().await;
        *state = reduce(mem::take(&mut *state), &action);
    }

    /// Shows `message` and removes it again after the alert timeout.
    pub async fn set_alert(&self, message: &str, kind: AlertKind) {
        let id = Uuid::new_v4();

        self.dispatch(Action::SetAlert(Alert {
            id,
            message: message.to_string(),
            kind,
        }))
        .await;

        let store = self.clone();
        tokio::spawn(async move {
            sleep(store.alert_timeout).await;
            store.dispatch(Action::RemoveAlert(id)).await;
        });
    }

    async fn alert_errors(&self, error: &ApiError) {
        for message in error.messages() {
            self.set_alert(&message, AlertKind::Danger).await;
        }
    }

    async fn post_failed(&self, error: ApiError) -> ApiError {
        self.alert_errors(&error).await;
        self.dispatch(Action::PostError(request_error(&error))).await;
        error
    }

    async fn profile_failed(&self, error: ApiError) -> ApiError {
        self.dispatch(Action::ProfileError(request_error(&error))).await;
        error
    }

    async fn api(&self) -> ApiClient {
        self.api.read().await.clone()
    }

    async fn use_token(&self, token: Option<String>) {
        self.api.write().await.set_token(token);
    }

    pub async fn load_user(&self) -> Result<(), ApiError> {
        match self.api().await.current_user().await {
            Ok(user) => {
                self.dispatch(Action::UserLoaded(user)).await;
                Ok(())
            }
            Err(e) => {
                self.use_token(None).await;
                self.dispatch(Action::AuthError).await;
                Err(e)
            }
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        match self.api().await.register(request).await {
            Ok(response) => {
                self.use_token(Some(response.token.clone())).await;
                self.dispatch(Action::RegisterSuccess {
                    token: response.token,
                })
                .await;
                self.load_user().await
            }
            Err(e) => {
                self.alert_errors(&e).await;
                self.dispatch(Action::RegisterFail).await;
                Err(e)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.api().await.login(&request).await {
            Ok(response) => {
                self.use_token(Some(response.token.clone())).await;
                self.dispatch(Action::LoginSuccess {
                    token: response.token,
                })
                .await;
                self.load_user().await
            }
            Err(e) => {
                self.alert_errors(&e).await;
                self.dispatch(Action::LoginFail).await;
                Err(e)
            }
        }
    }

    pub async fn logout(&self) {
        self.use_token(None).await;
        self.dispatch(Action::ClearProfile).await;
        self.dispatch(Action::Logout).await;
    }

    pub async fn get_posts(&self) -> Result<(), ApiError> {
        match self.api().await.posts().await {
            Ok(posts) => {
                self.dispatch(Action::GetPosts(posts)).await;
                Ok(())
            }
            Err(e) => Err(self.post_failed(e).await),
        }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<(), ApiError> {
        match self.api().await.post(id).await {
            Ok(post) => {
                self.dispatch(Action::GetPost(post)).await;
                Ok(())
            }
            Err(e) => Err(self.post_failed(e).await),
        }
    }

    pub async fn add_post(&self, text: &str) -> Result<(), ApiError> {
        match self.api().await.create_post(text).await {
            Ok(post) => {
                self.dispatch(Action::AddPost(post)).await;
                self.set_alert("Post created", AlertKind::Success).await;
                Ok(())
            }
            Err(e) => Err(self.post_failed(e).await),
        }
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), ApiError> {
        match self.api().await.delete_post(id).await {
            Ok(_) => {
                self.dispatch(Action::DeletePost(id)).await;
                self.set_alert("Post removed", AlertKind::Success).await;
                Ok(())
            }
            Err(e) => Err(self.post_failed(e).await),
        }
    }

    pub async fn add_like(&self, id: Uuid) -> Result<(), ApiError> {
        match self.api().await.like(id).await {
            Ok(likes) => {
                self.dispatch(Action::UpdateLikes { id, likes }).await;
                Ok(())
            }
            Err(e) => Err(self.post_failed(e).await),
        }
    }

    pub async fn remove_like(&self, id: Uuid) -> Result<(), ApiError> {
        match self.api().await.unlike(id).await {
            Ok(likes) => {
                self.dispatch(Action::UpdateLikes { id, likes }).await;
                Ok(())
            }
            Err(e) => Err(self.post_failed(e).await),
        }
    }

    pub async fn add_comment(&self, id: Uuid, text: &str) -> Result<(), ApiError> {
        match self.api().await.add_comment(id, text).await {
            Ok(comments) => {
                self.dispatch(Action::AddComment(comments)).await;
                self.set_alert("Comment added", AlertKind::Success).await;
                Ok(())
            }
            Err(e) => Err(self.post_failed(e).await),
        }
    }

    pub async fn delete_comment(&self, id: Uuid, comment: Uuid) -> Result<(), ApiError> {
        match self.api().await.remove_comment(id, comment).await {
            Ok(_) => {
                self.dispatch(Action::RemoveComment(comment)).await;
                self.set_alert("Comment removed", AlertKind::Success).await;
                Ok(())
            }
            Err(e) => Err(self.post_failed(e).await),
        }
    }

    pub async fn get_current_profile(&self) -> Result<(), ApiError> {
        match self.api().await.own_profile().await {
            Ok(profile) => {
                self.dispatch(Action::GetProfile(profile)).await;
                Ok(())
            }
            Err(e) => Err(self.profile_failed(e).await),
        }
    }

    pub async fn get_profiles(&self) -> Result<(), ApiError> {
        self.dispatch(Action::ClearProfiles).await;

        match self.api().await.profiles().await {
            Ok(profiles) => {
                self.dispatch(Action::GetProfiles(profiles)).await;
                Ok(())
            }
            Err(e) => Err(self.profile_failed(e).await),
        }
    }

    pub async fn get_profile_by_id(&self, user: Uuid) -> Result<(), ApiError> {
        match self.api().await.profile_by_user(user).await {
            Ok(profile) => {
                self.dispatch(Action::GetProfile(profile)).await;
                Ok(())
            }
            Err(e) => Err(self.profile_failed(e).await),
        }
    }

    pub async fn get_github_repos(&self, username: &str) -> Result<(), ApiError> {
        self.dispatch(Action::ClearRepos).await;

        match self.api().await.github_repos(username).await {
            Ok(repos) => {
                self.dispatch(Action::GetRepos(repos)).await;
                Ok(())
            }
            Err(e) => Err(self.profile_failed(e).await),
        }
    }

    /// `edit` only changes the confirmation message.
    pub async fn create_profile(
        &self,
        request: &ProfileRequest,
        edit: bool,
    ) -> Result<(), ApiError> {
        match self.api().await.upsert_profile(request).await {
            Ok(profile) => {
                self.dispatch(Action::GetProfile(profile)).await;
                let message = if edit { "Profile updated" } else { "Profile created" };
                self.set_alert(message, AlertKind::Success).await;
                Ok(())
            }
            Err(e) => {
                self.alert_errors(&e).await;
                Err(self.profile_failed(e).await)
            }
        }
    }

    pub async fn add_experience(&self, request: &ExperienceRequest) -> Result<(), ApiError> {
        match self.api().await.add_experience(request).await {
            Ok(profile) => {
                self.dispatch(Action::UpdateProfile(profile)).await;
                self.set_alert("Experience added", AlertKind::Success).await;
                Ok(())
            }
            Err(e) => {
                self.alert_errors(&e).await;
                Err(self.profile_failed(e).await)
            }
        }
    }

    pub async fn add_education(&self, request: &EducationRequest) -> Result<(), ApiError> {
        match self.api().await.add_education(request).await {
            Ok(profile) => {
                self.dispatch(Action::UpdateProfile(profile)).await;
                self.set_alert("Education added", AlertKind::Success).await;
                Ok(())
            }
            Err(e) => {
                self.alert_errors(&e).await;
                Err(self.profile_failed(e).await)
            }
        }
    }

    pub async fn delete_experience(&self, id: Uuid) -> Result<(), ApiError> {
        match self.api().await.remove_experience(id).await {
            Ok(profile) => {
                self.dispatch(Action::UpdateProfile(profile)).await;
                self.set_alert("Experience deleted", AlertKind::Success).await;
                Ok(())
            }
            Err(e) => Err(self.profile_failed(e).await),
        }
    }

    pub async fn delete_education(&self, id: Uuid) -> Result<(), ApiError> {
        match self.api().await.remove_education(id).await {
            Ok(profile) => {
                self.dispatch(Action::UpdateProfile(profile)).await;
                self.set_alert("Education deleted", AlertKind::Success).await;
                Ok(())
            }
            Err(e) => Err(self.profile_failed(e).await),
        }
    }

    /// Irreversible, callers confirm with the user first.
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        match self.api().await.delete_account().await {
            Ok(_) => {
                self.use_token(None).await;
                self.dispatch(Action::ClearProfile).await;
                self.dispatch(Action::AccountDeleted).await;
                self.set_alert("Your account has been deleted", AlertKind::Success).await;
                Ok(())
            }
            Err(e) => Err(self.profile_failed(e).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::new(ApiClient::new("http://127.0.0.1:9"))
            .with_alert_timeout(Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_dispatch_updates_state() {
        let store = store();

        store
            .dispatch(Action::LoginSuccess {
                token: "t".to_string(),
            })
            .await;

        let state = store.state().await;
        assert!(state.auth.is_authenticated);
        assert_eq!(state.auth.token.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_alert_expires() {
        let store = store();

        store.set_alert("Post created", AlertKind::Success).await;
        assert_eq!(store.state().await.alerts.len(), 1);

        sleep(Duration::from_millis(100)).await;
        assert!(store.state().await.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_auth_and_profile() {
        let store = store();
        store
            .dispatch(Action::LoginSuccess {
                token: "t".to_string(),
            })
            .await;

        store.logout().await;

        let state = store.state().await;
        assert!(!state.auth.is_authenticated);
        assert!(state.profile.profile.is_none());
        assert!(state.profile.loading);
    }
}
