use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State as AxumState},
};
use models::{
    Comment, Like, Post, ProfileView, RepoSummary, UserView,
    payloads::{
        EducationRequest, ExperienceRequest, LoginRequest, MessageResponse, ProfileRequest,
        RegisterRequest, TextRequest, TokenResponse,
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::AppError,
    posts, profile,
    state::State,
    users,
    validate::ValidJson,
};

type AppState = AxumState<Arc<State>>;
type ApiResult<T> = Result<Json<T>, AppError>;

/// Unparseable ids behave like ids with no match.
fn parse_id(raw: &str, not_found: &'static str) -> Result<Uuid, AppError> {
    raw.parse().map_err(|_| AppError::NotFound(not_found))
}

fn post_id(raw: &str) -> Result<Uuid, AppError> {
    parse_id(raw, "Post not found")
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

pub async fn register_handler(
    AxumState(state): AppState,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> ApiResult<TokenResponse> {
    let user = users::register(&state.db, request).await?;

    Ok(Json(TokenResponse {
        token: state.tokens.issue(user.id)?,
    }))
}

pub async fn login_handler(
    AxumState(state): AppState,
    ValidJson(request): ValidJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let user = users::authenticate(&state.db, &request.email, request.password).await?;

    Ok(Json(TokenResponse {
        token: state.tokens.issue(user.id)?,
    }))
}

pub async fn current_user_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
) -> ApiResult<UserView> {
    let user = users::get_by_id(&state.db, identity).await?;

    Ok(Json(UserView::from(&user)))
}

pub async fn list_posts_handler(
    AxumState(state): AppState,
    AuthUser(_): AuthUser,
) -> ApiResult<Vec<Post>> {
    Ok(Json(posts::list(&state.db).await?))
}

pub async fn create_post_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    ValidJson(request): ValidJson<TextRequest>,
) -> ApiResult<Post> {
    Ok(Json(posts::create(&state.db, identity, &request.text).await?))
}

pub async fn get_post_handler(
    AxumState(state): AppState,
    AuthUser(_): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Post> {
    Ok(Json(posts::get(&state.db, post_id(&id)?).await?))
}

pub async fn update_post_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<TextRequest>,
) -> ApiResult<Post> {
    let post = posts::update(&state.db, post_id(&id)?, identity, &request.text).await?;

    Ok(Json(post))
}

pub async fn delete_post_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    posts::delete(&state.db, post_id(&id)?, identity).await?;

    Ok(message("Post removed"))
}

pub async fn like_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<Like>> {
    Ok(Json(posts::like(&state.db, post_id(&id)?, identity).await?))
}

pub async fn unlike_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<Like>> {
    Ok(Json(posts::unlike(&state.db, post_id(&id)?, identity).await?))
}

pub async fn add_comment_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<TextRequest>,
) -> ApiResult<Vec<Comment>> {
    let comments = posts::add_comment(&state.db, post_id(&id)?, identity, &request.text).await?;

    Ok(Json(comments))
}

pub async fn remove_comment_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    Path((id, comment_id)): Path<(String, String)>,
) -> ApiResult<Vec<Comment>> {
    let post = post_id(&id)?;
    let comment = parse_id(&comment_id, "Comment does not exist")?;

    Ok(Json(
        posts::remove_comment(&state.db, post, comment, identity).await?,
    ))
}

pub async fn own_profile_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
) -> ApiResult<ProfileView> {
    Ok(Json(profile::get_own(&state.db, identity).await?))
}

pub async fn list_profiles_handler(AxumState(state): AppState) -> ApiResult<Vec<ProfileView>> {
    Ok(Json(profile::list_all(&state.db).await?))
}

pub async fn user_profile_handler(
    AxumState(state): AppState,
    Path(user_id): Path<String>,
) -> ApiResult<ProfileView> {
    let user = parse_id(&user_id, "Profile not found")?;

    Ok(Json(profile::get_by_user(&state.db, user).await?))
}

pub async fn upsert_profile_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    ValidJson(request): ValidJson<ProfileRequest>,
) -> ApiResult<ProfileView> {
    Ok(Json(profile::upsert(&state.db, identity, request).await?))
}

pub async fn delete_account_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
) -> ApiResult<MessageResponse> {
    profile::delete_account(&state.db, identity).await?;

    Ok(message("User deleted"))
}

pub async fn add_experience_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    ValidJson(request): ValidJson<ExperienceRequest>,
) -> ApiResult<ProfileView> {
    Ok(Json(
        profile::add_experience(&state.db, identity, request).await?,
    ))
}

pub async fn remove_experience_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    Path(entry_id): Path<String>,
) -> ApiResult<ProfileView> {
    // An id that cannot exist is the same no-op as one that does not.
    let profile = match entry_id.parse() {
        Ok(entry) => profile::remove_experience(&state.db, identity, entry).await?,
        Err(_) => profile::get_own(&state.db, identity).await?,
    };

    Ok(Json(profile))
}

pub async fn add_education_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    ValidJson(request): ValidJson<EducationRequest>,
) -> ApiResult<ProfileView> {
    Ok(Json(
        profile::add_education(&state.db, identity, request).await?,
    ))
}

pub async fn remove_education_handler(
    AxumState(state): AppState,
    AuthUser(identity): AuthUser,
    Path(entry_id): Path<String>,
) -> ApiResult<ProfileView> {
    let profile = match entry_id.parse() {
        Ok(entry) => profile::remove_education(&state.db, identity, entry).await?,
        Err(_) => profile::get_own(&state.db, identity).await?,
    };

    Ok(Json(profile))
}

pub async fn github_handler(
    AxumState(state): AppState,
    Path(username): Path<String>,
) -> ApiResult<Vec<RepoSummary>> {
    Ok(Json(state.github.fetch_repos(&username).await?))
}
