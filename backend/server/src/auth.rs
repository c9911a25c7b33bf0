//! # Identity
//!
//! Passwords are stored as salted Argon2 PHC strings. Tokens are HS256 JWTs
//! carrying the user id, presented in the `x-auth-token` header.
use std::{
    sync::{Arc, LazyLock},
    time::Duration,
};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::{sync::OnceCell, task::spawn_blocking};
use tracing::debug;
use uuid::Uuid;

use crate::{error::AppError, state::State};

pub const TOKEN_HEADER: &str = "x-auth-token";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user: Uuid,
    iat: i64,
    exp: i64,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            ttl,
        }
    }

    pub fn issue(&self, user: Uuid) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| AppError::internal("Token lifetime out of range"))?;
        let claims = Claims {
            user,
            iat: now,
            exp,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::internal)
    }

    /// Any signature, format or expiry failure is a rejection.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.user)
            .map_err(|e| {
                debug!("Rejected token: {e}");
                AppError::InvalidToken
            })
    }
}

pub async fn hash_password(password: String) -> Result<String, AppError> {
    spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(AppError::internal)
    })
    .await
    .map_err(AppError::internal)?
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash).map_err(AppError::internal)?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(AppError::internal)?
}

static DUMMY_HASH: LazyLock<OnceCell<String>> = LazyLock::new(OnceCell::new);

/// Hash checked when no account matches, so a miss costs one Argon2 verify
/// like a wrong password does.
pub async fn dummy_hash() -> Result<String, AppError> {
    DUMMY_HASH
        .get_or_try_init(|| hash_password("devconnect-no-such-user".to_string()))
        .await
        .cloned()
}

/// Gravatar for `email`, mystery-person fallback.
pub fn avatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());

    format!("https://www.gravatar.com/avatar/{digest:x}?s=200&r=pg&d=mm")
}

/// Caller identity taken from a verified token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

impl FromRequestParts<Arc<State>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<State>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(AppError::MissingToken)?;

        state.tokens.verify(token).map(AuthUser)
    }
}
