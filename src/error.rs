//! Crate-wide error type, rendered as the `{success: false, message}`
//! envelope every failure response carries.

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    #[error("storage error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Maps a unique-constraint violation to a friendly validation error;
    /// everything else stays a storage failure.
    pub fn on_unique_violation(err: sqlx::Error, msg: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Validation(msg.to_string())
            }
            _ => Self::Database(err),
        }
    }

    /// Same mapping for foreign-key violations.
    pub fn on_fk_violation(err: sqlx::Error, msg: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Self::Validation(msg.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::Database(err) => {
                tracing::error!(error = %err, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
        };

        let mut body = serde_json::json!({ "success": false, "message": message });
        // Raw driver text never reaches callers in release builds.
        #[cfg(debug_assertions)]
        if let Self::Database(err) = &self {
            body["detail"] = serde_json::Value::String(err.to_string());
        }

        (status, Json(body)).into_response()
    }
}
