use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::db;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid_credentials")]
    InvalidCredentials,
    #[error("duplicate_email")]
    DuplicateEmail,

    #[error(transparent)]
    DB(#[from] db::Error),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    pub error: String,
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("invalid_credentials", "Invalid email or password")),
            ),
            Error::DuplicateEmail => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new("duplicate_email", "Email already exists")),
            ),
            err => {
                tracing::error!("{err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("unexpected", "Unexpected error")),
                )
            }
        }
        .into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
