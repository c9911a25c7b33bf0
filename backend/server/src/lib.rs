//! Documentation of the developer social network API.
//!
//! # Layout
//! - Users register, log in and get a signed token back
//! - Every protected route reads the token from the `x-auth-token` header
//! - Profiles are one per user and embed experience and education lists
//! - Posts embed their likes and comments
//! - Only the owner of a post or comment may change or remove it
//!
//!
//!
//! # Errors
//!
//! - Validation failures: 400 `{ "errors": [{ "message": ... }] }`
//! - Single cause failures: 400/401/404/409 `{ "message": ... }`
//! - Anything unexpected: 500 `Server error`, details only in the logs
//!
//!
//!
//! # Running
//!
//! Redis backed.
//! ```sh
//! JWT_SECRET=change-me REDIS_URL=redis://localhost:6379 cargo run -p devconnect
//! ```
//!
//! Throwaway in-memory store.
//! ```sh
//! JWT_SECRET=change-me STORE_BACKEND=memory cargo run -p devconnect
//! ```
//!
//! Logs follow `RUST_LOG`.
//! ```sh
//! RUST_LOG=server=debug,tower_http=info
//! ```
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::{delete, get, post, put},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod github;
pub mod guard;
pub mod posts;
pub mod profile;
pub mod routes;
pub mod state;
pub mod users;
pub mod validate;

use auth::TOKEN_HEADER;
use config::Config;
use routes::*;
use state::State;

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)])
        .max_age(state.config.cors_max_age);

    let api = Router::new()
        .route("/users", post(register_handler))
        .route("/auth", get(current_user_handler).post(login_handler))
        .route("/posts", get(list_posts_handler).post(create_post_handler))
        .route(
            "/posts/{id}",
            get(get_post_handler)
                .put(update_post_handler)
                .delete(delete_post_handler),
        )
        .route("/posts/like/{id}", put(like_handler))
        .route("/posts/unlike/{id}", put(unlike_handler))
        .route("/posts/comment/{id}", post(add_comment_handler))
        .route(
            "/posts/comment/{id}/{comment_id}",
            delete(remove_comment_handler),
        )
        .route(
            "/profile",
            get(list_profiles_handler)
                .post(upsert_profile_handler)
                .delete(delete_account_handler),
        )
        .route("/profile/me", get(own_profile_handler))
        .route("/profile/user/{user_id}", get(user_profile_handler))
        .route("/profile/experience", put(add_experience_handler))
        .route(
            "/profile/experience/{entry_id}",
            delete(remove_experience_handler),
        )
        .route("/profile/education", put(add_education_handler))
        .route(
            "/profile/education/{entry_id}",
            delete(remove_education_handler),
        )
        .route("/profile/github/{username}", get(github_handler));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config).await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
