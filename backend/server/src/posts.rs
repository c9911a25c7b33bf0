//! # Posts
//!
//! Likes and comments live inside the post document. Every mutation reads the
//! post, edits the embedded list and saves it at the version it was read, so
//! a concurrent edit surfaces as a conflict instead of a lost update.
use chrono::Utc;
use models::{
    Comment, Like, Post,
    documents::{find_by_id, push_front, remove_by_id},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    database::{Database, Versioned},
    error::AppError,
    guard::ensure_owner,
    users,
};

const POST_NOT_FOUND: AppError = AppError::NotFound("Post not found");

async fn find(db: &Database, id: Uuid) -> Result<Versioned<Post>, AppError> {
    db.find::<Post>(&id.to_string())
        .await?
        .ok_or(POST_NOT_FOUND)
}

/// Blank text is rejected, anything else is stored as sent.
fn require_text(text: &str) -> Result<String, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::validation("Text is required"));
    }

    Ok(text.to_string())
}

pub async fn create(db: &Database, identity: Uuid, text: &str) -> Result<Post, AppError> {
    let text = require_text(text)?;
    let author = users::get_by_id(db, identity).await?;

    let mut post = Versioned::new(Post {
        id: Uuid::new_v4(),
        user: identity,
        text,
        name: author.name,
        avatar: author.avatar,
        likes: Vec::new(),
        comments: Vec::new(),
        date: Utc::now(),
    });
    db.save(&mut post).await?;

    info!("User {identity} created post {}", post.id);
    Ok(post.into_inner())
}

/// Newest first.
pub async fn list(db: &Database) -> Result<Vec<Post>, AppError> {
    let mut posts = db.all::<Post>().await?;
    posts.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(posts)
}

pub async fn get(db: &Database, id: Uuid) -> Result<Post, AppError> {
    Ok(find(db, id).await?.into_inner())
}

pub async fn update(db: &Database, id: Uuid, identity: Uuid, text: &str) -> Result<Post, AppError> {
    let text = require_text(text)?;
    let mut post = find(db, id).await?;
    ensure_owner(&*post, identity)?;

    post.text = text;
    db.save(&mut post).await?;

    Ok(post.into_inner())
}

pub async fn delete(db: &Database, id: Uuid, identity: Uuid) -> Result<(), AppError> {
    let post = find(db, id).await?;
    ensure_owner(&*post, identity)?;

    db.remove::<Post>(&id.to_string()).await?;

    info!("User {identity} removed post {id}");
    Ok(())
}

/// Liking twice is an error, not a no-op.
pub async fn like(db: &Database, id: Uuid, identity: Uuid) -> Result<Vec<Like>, AppError> {
    let mut post = find(db, id).await?;
    users::get_by_id(db, identity).await?;

    if post.liked_by(identity) {
        return Err(AppError::AlreadyLiked);
    }

    push_front(&mut post.likes, Like { user: identity });
    db.save(&mut post).await?;

    Ok(post.into_inner().likes)
}

pub async fn unlike(db: &Database, id: Uuid, identity: Uuid) -> Result<Vec<Like>, AppError> {
    let mut post = find(db, id).await?;

    if !post.liked_by(identity) {
        return Err(AppError::NotLiked);
    }

    post.likes.retain(|like| like.user != identity);
    db.save(&mut post).await?;

    Ok(post.into_inner().likes)
}

pub async fn add_comment(
    db: &Database,
    id: Uuid,
    identity: Uuid,
    text: &str,
) -> Result<Vec<Comment>, AppError> {
    let text = require_text(text)?;
    let mut post = find(db, id).await?;
    let author = users::get_by_id(db, identity).await?;

    push_front(
        &mut post.comments,
        Comment {
            id: Uuid::new_v4(),
            user: identity,
            text,
            name: author.name,
            avatar: author.avatar,
            date: Utc::now(),
        },
    );
    db.save(&mut post).await?;

    Ok(post.into_inner().comments)
}

/// Only the comment's author may remove it, whoever owns the post.
pub async fn remove_comment(
    db: &Database,
    id: Uuid,
    comment: Uuid,
    identity: Uuid,
) -> Result<Vec<Comment>, AppError> {
    let mut post = find(db, id).await?;

    let found = find_by_id(&post.comments, comment)
        .ok_or(AppError::NotFound("Comment does not exist"))?;
    ensure_owner(found, identity)?;

    remove_by_id(&mut post.comments, comment);
    db.save(&mut post).await?;

    Ok(post.into_inner().comments)
}
