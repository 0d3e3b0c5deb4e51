use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Handler result type alias.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type, mapped to HTTP responses.
///
/// Authentication failures deliberately carry no detail about which check
/// failed, so callers cannot enumerate accounts.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    WeakPassword(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Invalid or expired verification token")]
    InvalidToken,

    #[error("Please verify your email before logging in")]
    EmailNotVerified,

    #[error("Two-factor authentication is already enabled")]
    AlreadyEnabled,

    #[error("Two-factor setup has not been started")]
    SetupNotStarted,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Invalid or corrupted backup archive")]
    InvalidArchive,

    #[error("Database file not found in backup")]
    MissingStore,

    #[error("storage operation failed")]
    Storage(#[source] anyhow::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::WeakPassword(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::InvalidCode | ApiError::InvalidPassword => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::InvalidToken => StatusCode::BAD_REQUEST,
            ApiError::EmailNotVerified => StatusCode::FORBIDDEN,
            ApiError::AlreadyEnabled | ApiError::SetupNotStarted => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidArchive | ApiError::MissingStore => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Internal detail is logged, never sent to the client.
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                "An internal error occurred".to_string()
            }
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "storage error");
                self.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let msg = db_err.message().to_string();
                if msg.contains("users.username") {
                    ApiError::Conflict("Username already taken".into())
                } else if msg.contains("users.email") {
                    ApiError::Conflict("Email already registered".into())
                } else {
                    ApiError::Conflict("Resource already exists".into())
                }
            }
            other => ApiError::Internal(other.into()),
        }
    }
}
