use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced at the HTTP boundary.
///
/// Every variant maps to exactly one status code. `Internal` and `Database`
/// never leak their details to the caller; those are logged instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(DbErr),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Translate a unique-constraint violation into `Conflict` with a
    /// caller-specific message, falling back to the generic mapping.
    pub fn conflict_on_unique(err: DbErr, message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(message.to_string()),
            _ => AppError::from(err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::Internal(_) | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("El registro ya existe".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::BadRequest("Referencia inválida a otro registro".to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => {
                tracing::debug!(status = %status, "{}", msg);
                msg
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                msg
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Error en el servidor".to_string()
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {}", err);
                "Error en el servidor".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
