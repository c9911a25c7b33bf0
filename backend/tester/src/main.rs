use anyhow::{Context, bail, ensure};
use clap::Parser;
use client::{ApiClient, ApiError, AlertKind, Store};
use models::payloads::RegisterRequest;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

/// Smoke test against a running server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://localhost:5000")]
    base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let store = Store::new(ApiClient::new(&args.base_url));

    let email = format!("tester-{}@example.com", Uuid::new_v4().simple());
    let password = "secret1";

    info!("Registering {email}");
    store
        .register(&RegisterRequest {
            name: "Tester".to_string(),
            email: email.clone(),
            password: password.to_string(),
        })
        .await
        .context("register")?;

    store.logout().await;

    info!("Logging in");
    store.login(&email, password).await.context("login")?;

    let state = store.state().await;
    let user = state.auth.user.context("no user after login")?;
    ensure!(state.auth.is_authenticated, "not authenticated after login");

    store.add_post("hello").await.context("create post")?;
    let post = store
        .state()
        .await
        .post
        .posts
        .first()
        .cloned()
        .context("post missing from state")?;
    ensure!(post.text == "hello", "unexpected post text {}", post.text);

    info!("Liking post {}", post.id);
    store.add_like(post.id).await.context("like")?;

    let likes = &store.state().await.post.posts[0].likes;
    ensure!(
        likes.len() == 1 && likes[0].user == user.id,
        "unexpected likes {likes:?}"
    );

    match store.add_like(post.id).await {
        Err(ApiError::Api { status: 400, messages }) => {
            ensure!(
                messages == ["Post already liked"],
                "unexpected messages {messages:?}"
            );
        }
        Err(e) => bail!("second like failed the wrong way: {e}"),
        Ok(()) => bail!("second like succeeded"),
    }

    let alerts = store.state().await.alerts;
    ensure!(
        alerts.iter().any(|a| a.kind == AlertKind::Danger),
        "no alert for the rejected like"
    );

    info!("Cleaning up");
    store.delete_account().await.context("delete account")?;

    info!("All checks passed");
    Ok(())
}
