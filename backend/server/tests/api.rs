use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{app, config::Config, database::Database, state::State};
use tower::ServiceExt;

fn test_app() -> Router {
    let state = State::with_database(Config::local("integration-secret"), Database::memory())
        .expect("state builds");

    app(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        request = request.header("x-auth-token", token);
    }

    let request = match body {
        Some(body) => request
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    (status, value)
}

async fn register(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "name": name, "email": email, "password": "secret1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn user_id(app: &Router, token: &str) -> String {
    let (_, body) = send(app, Method::GET, "/api/auth", Some(token), None).await;

    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_login_like_scenario() {
    let app = test_app();
    register(&app, "A", "a@x.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth",
        None,
        Some(json!({ "email": "a@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    let id = user_id(&app, &token).await;

    let (status, post) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(&token),
        Some(json!({ "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["text"], "hello");
    assert_eq!(post["name"], "A");
    assert_eq!(post["likes"], json!([]));
    assert_eq!(post["comments"], json!([]));

    let like_uri = format!("/api/posts/like/{}", post["id"].as_str().unwrap());
    let (status, likes) = send(&app, Method::PUT, &like_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(likes, json!([{ "user": id }]));

    let (status, body) = send(&app, Method::PUT, &like_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Post already liked");
}

#[tokio::test]
async fn test_duplicate_registration() {
    let app = test_app();
    register(&app, "A", "a@x.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "name": "B", "email": "a@x.com", "password": "secret2" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "User already exists");
}

#[tokio::test]
async fn test_registration_validation_envelope() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "email": "nope", "password": "123" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let app = test_app();
    register(&app, "A", "a@x.com").await;

    let wrong_password = send(
        &app,
        Method::POST,
        "/api/auth",
        None,
        Some(json!({ "email": "a@x.com", "password": "wrong-one" })),
    )
    .await;
    let unknown_email = send(
        &app,
        Method::POST,
        "/api/auth",
        None,
        Some(json!({ "email": "b@x.com", "password": "secret1" })),
    )
    .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn test_token_required() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token, authorization denied");

    let (status, body) = send(&app, Method::GET, "/api/posts", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is not valid");
}

#[tokio::test]
async fn test_current_user_hides_password() {
    let app = test_app();
    let token = register(&app, "A", "a@x.com").await;

    let (status, body) = send(&app, Method::GET, "/api/auth", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@x.com");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_non_owner_cannot_delete_post_or_comment() {
    let app = test_app();
    let a = register(&app, "A", "a@x.com").await;
    let b = register(&app, "B", "b@x.com").await;

    let (_, post) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(&a),
        Some(json!({ "text": "hello" })),
    )
    .await;
    let post_id = post["id"].as_str().unwrap();
    let post_uri = format!("/api/posts/{post_id}");

    let (status, body) = send(&app, Method::DELETE, &post_uri, Some(&b), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not authorized");

    let (_, comments) = send(
        &app,
        Method::POST,
        &format!("/api/posts/comment/{post_id}"),
        Some(&a),
        Some(json!({ "text": "nice" })),
    )
    .await;
    let comment_uri = format!(
        "/api/posts/comment/{post_id}/{}",
        comments[0]["id"].as_str().unwrap()
    );

    let (status, _) = send(&app, Method::DELETE, &comment_uri, Some(&b), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, fetched) = send(&app, Method::GET, &post_uri, Some(&b), None).await;
    assert_eq!(fetched["comments"].as_array().unwrap().len(), 1);

    let (status, comments) = send(&app, Method::DELETE, &comment_uri, Some(&a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments, json!([]));

    let (status, body) = send(&app, Method::DELETE, &post_uri, Some(&a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post removed");

    let (status, body) = send(&app, Method::GET, &post_uri, Some(&a), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn test_malformed_post_id_is_not_found() {
    let app = test_app();
    let token = register(&app, "A", "a@x.com").await;

    let (status, body) = send(&app, Method::GET, "/api/posts/12345", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn test_unlike_without_like() {
    let app = test_app();
    let token = register(&app, "A", "a@x.com").await;
    let (_, post) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(&token),
        Some(json!({ "text": "hello" })),
    )
    .await;

    let uri = format!("/api/posts/unlike/{}", post["id"].as_str().unwrap());
    let (status, body) = send(&app, Method::PUT, &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Post has not yet been liked");
}

#[tokio::test]
async fn test_profile_lifecycle_and_account_deletion() {
    let app = test_app();
    let token = register(&app, "A", "a@x.com").await;
    let id = user_id(&app, &token).await;

    let (status, body) = send(&app, Method::GET, "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "There is no profile for this user");

    let (status, profile) = send(
        &app,
        Method::POST,
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "Developer", "skills": "rust, go", "githubusername": "octocat" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["skills"], json!(["rust", "go"]));
    assert_eq!(profile["user"]["name"], "A");

    let (status, profile) = send(
        &app,
        Method::PUT,
        "/api/profile/experience",
        Some(&token),
        Some(json!({ "title": "Engineer", "company": "Acme", "from": "2020-01-01", "current": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["experience"][0]["title"], "Engineer");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/profile/education",
        Some(&token),
        Some(json!({ "school": "MIT" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);

    let entry = profile["experience"][0]["id"].as_str().unwrap();
    let (status, profile) = send(
        &app,
        Method::DELETE,
        &format!("/api/profile/experience/{entry}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["experience"], json!([]));

    let (status, profiles) = send(&app, Method::GET, "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profiles.as_array().unwrap().len(), 1);

    send(
        &app,
        Method::POST,
        "/api/posts",
        Some(&token),
        Some(json!({ "text": "bye" })),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted");

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/profile/user/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let other = register(&app, "B", "b@x.com").await;
    let (_, posts) = send(&app, Method::GET, "/api/posts", Some(&other), None).await;
    assert_eq!(posts, json!([]));
}

#[tokio::test]
async fn test_bad_github_username_is_not_found() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/profile/github/not..valid",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No Github profile found");
}

#[tokio::test]
async fn test_deleted_account_token_cannot_recreate_profile() {
    let app = test_app();
    let token = register(&app, "A", "a@x.com").await;
    let id = user_id(&app, &token).await;
    let profile = json!({ "status": "Developer", "skills": "rust" });

    send(&app, Method::POST, "/api/profile", Some(&token), Some(profile.clone())).await;
    let (status, _) = send(&app, Method::DELETE, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::POST, "/api/profile", Some(&token), Some(profile)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/profile/user/{id}");
    let (status, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
