use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Central error type for all handlers. Maps one-to-one onto HTTP status
/// codes; conflict variants carry the machine-readable detail the client
/// needs to recover.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    /// Requested days that are already reserved, canonical `YYYY-MM-DD`.
    #[error("dates already reserved")]
    DatesTaken(Vec<String>),
    /// Unique field collision on registration (`username` or `email`).
    #[error("{field} already in use")]
    Duplicate { field: &'static str },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.into())
    }
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatesTaken(_) | AppError::Duplicate { .. } => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::DatesTaken(days) => json!({
                "error": self.to_string(),
                "occupied_dates": days,
            }),
            AppError::Duplicate { field } => json!({
                "error": self.to_string(),
                "field": field,
            }),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                json!({ "error": "internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Constraint name if the error is a Postgres unique violation, so callers
/// can translate race losers into the same Conflict response as their
/// pre-checks.
pub fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            db.constraint().map(|c| c.to_string())
        }
        _ => None,
    }
}
