//! HTTP-facing errors rendered as the `{status: "error", message}` envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::response::ErrorEnvelope;

pub const USER_NOT_FOUND: &str = "That user does not exist.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("That user does not exist.")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    /// A row was rejected by a storage constraint (not-null, unique, check).
    #[error("{0}")]
    Constraint(String),

    #[error("The request timed out.")]
    Timeout,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::Constraint(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Promotes constraint violations reported by Postgres out of an opaque
    /// storage error; everything else stays internal.
    pub fn from_storage(err: anyhow::Error) -> Self {
        let constraint = err
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .filter(|db| {
                matches!(
                    db.kind(),
                    sqlx::error::ErrorKind::UniqueViolation
                        | sqlx::error::ErrorKind::NotNullViolation
                        | sqlx::error::ErrorKind::CheckViolation
                )
            })
            .map(|db| db.message().to_string());

        match constraint {
            Some(message) => ApiError::Constraint(message),
            None => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(e) => {
                error!(error = ?e, "internal error");
                "An internal error occurred.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorEnvelope::new(message))).into_response()
    }
}
