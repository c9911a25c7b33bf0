use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use models::payloads::{ErrorEntry, ErrorsResponse, MessageResponse};
use thiserror::Error;
use tracing::error;

use crate::database::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request")]
    Validation(Vec<String>),

    #[error("User already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No token, authorization denied")]
    MissingToken,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("User not authorized")]
    NotOwner,

    #[error("There is no profile for this user")]
    NoProfile,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Post already liked")]
    AlreadyLiked,

    #[error("Post has not yet been liked")]
    NotLiked,

    #[error("No Github profile found")]
    Upstream,

    #[error("Resource was modified concurrently, retry")]
    Conflict,

    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        AppError::InternalError(error.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DuplicateEmail
            | AppError::NoProfile
            | AppError::AlreadyLiked
            | AppError::NotLiked => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::NotOwner => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::Upstream => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict => AppError::Conflict,
            other => AppError::internal(other),
        }
    }
}

fn errors_body(messages: Vec<String>) -> Json<ErrorsResponse> {
    Json(ErrorsResponse {
        errors: messages
            .into_iter()
            .map(|message| ErrorEntry { message })
            .collect(),
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::Validation(messages) => (status, errors_body(messages)).into_response(),
            AppError::DuplicateEmail | AppError::InvalidCredentials => {
                (status, errors_body(vec![self.to_string()])).into_response()
            }
            AppError::InternalError(ref cause) => {
                error!(error = %cause, "Request failed");

                (status, "Server error").into_response()
            }
            _ => (
                status,
                Json(MessageResponse {
                    message: self.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
