//! Error taxonomy shared by all handlers.
//!
//! Every variant renders as `{"detail": "..."}` with the matching status code.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("Username already registered")]
    Conflict,

    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Not enough permissions")]
    Forbidden,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            // duplicate usernames answer 400, not 409
            Self::Conflict | Self::InvalidCredentials | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            error!("Failed to handle request: {err:#}");
        }

        let status = self.status();
        let body = Json(ErrorBody {
            detail: self.to_string(),
        });

        if matches!(self, Self::Unauthenticated) {
            (
                status,
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                body,
            )
                .into_response()
        } else {
            (status, body).into_response()
        }
    }
}
