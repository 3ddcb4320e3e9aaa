use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::{auth, db};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("validation")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] auth::Error),
    #[error(transparent)]
    DB(db::Error),
    #[error("unexpected")]
    Unexpected(String),
}

impl From<db::Error> for Error {
    fn from(error: db::Error) -> Self {
        match error {
            db::Error::NotFound(msg) => Self::NotFound(msg),
            error => Self::DB(error),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for Error {
    fn from(error: axum::extract::multipart::MultipartError) -> Self {
        Self::Validation(error.body_text())
    }
}

#[derive(Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ErrorResponse {
    Unexpected { message: String },
    NotFound { message: String },
    Unauthorized { message: String },
    Validation { message: String },
}

impl From<Error> for ErrorResponse {
    fn from(error: Error) -> Self {
        match error {
            Error::NotFound(message) => Self::NotFound { message },
            Error::Unauthorized => Self::Unauthorized {
                message: "Login required".into(),
            },
            Error::Validation(message) => Self::Validation { message },
            Error::Unexpected(message) => {
                tracing::error!("{message}");
                Self::Unexpected { message }
            }
            error => {
                tracing::error!("{:?}", error);
                Self::Unexpected {
                    message: "Unexpected error".into(),
                }
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Error::Auth(error) => return error.into_response(),
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut res = axum::Json(ErrorResponse::from(self)).into_response();
        *res.status_mut() = status;
        res
    }
}
