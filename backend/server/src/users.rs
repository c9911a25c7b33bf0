//! # User Directory
//!
//! Registration, credential checks and lookups. Emails are unique through the
//! `users:email` index, which is claimed before the user document is written.
use chrono::Utc;
use models::{User, payloads::RegisterRequest};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{avatar_url, dummy_hash, hash_password, verify_password},
    database::{Database, EMAIL_INDEX, Versioned},
    error::AppError,
    validate::normalize_email,
};

pub async fn register(db: &Database, request: RegisterRequest) -> Result<User, AppError> {
    let email = normalize_email(&request.email);

    if db.lookup(EMAIL_INDEX, &email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let user = User {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        avatar: avatar_url(&email),
        password: hash_password(request.password).await?,
        email,
        date: Utc::now(),
    };

    if !db.claim(EMAIL_INDEX, &user.email, &user.id.to_string()).await? {
        return Err(AppError::DuplicateEmail);
    }

    let mut doc = Versioned::new(user);
    if let Err(e) = db.save(&mut doc).await {
        warn!("Failed to store user {}, releasing email", doc.id);
        db.release(EMAIL_INDEX, &doc.email).await?;
        return Err(e.into());
    }

    info!("Registered user {}", doc.id);
    Ok(doc.into_inner())
}

/// The hash a login attempt is checked against. Misses get the dummy hash so
/// every attempt pays for exactly one Argon2 verify.
async fn hash_to_check(user: Option<&User>) -> Result<String, AppError> {
    match user {
        Some(user) => Ok(user.password.clone()),
        None => dummy_hash().await,
    }
}

/// Unknown email and wrong password fail identically.
pub async fn authenticate(db: &Database, email: &str, password: String) -> Result<User, AppError> {
    let user = match db.lookup(EMAIL_INDEX, &normalize_email(email)).await? {
        Some(id) => db.find::<User>(&id).await?.map(Versioned::into_inner),
        None => None,
    };

    let hash = hash_to_check(user.as_ref()).await?;
    let matched = verify_password(password, hash).await?;

    match user {
        Some(user) if matched => Ok(user),
        _ => Err(AppError::InvalidCredentials),
    }
}

pub async fn get_by_id(db: &Database, id: Uuid) -> Result<User, AppError> {
    db.find::<User>(&id.to_string())
        .await?
        .map(Versioned::into_inner)
        .ok_or(AppError::NotFound("User not found"))
}

/// Frees the email, then removes the user. Safe to repeat: with the user
/// record already gone the email is released by owner id instead.
pub async fn delete(db: &Database, id: Uuid) -> Result<(), AppError> {
    let key = id.to_string();

    match db.find::<User>(&key).await? {
        Some(user) => {
            db.release(EMAIL_INDEX, &user.email).await?;
            db.remove::<User>(&key).await?;
        }
        None => {
            let released = db.release_value(EMAIL_INDEX, &key).await?;
            if released > 0 {
                warn!("Released {released} stale email claims for {id}");
            }
        }
    }

    Ok(())
}
