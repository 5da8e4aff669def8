use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A user with the given email already exists.
    #[error("Duplicate key: user with email {0} already exists")]
    DuplicateKey(String),

    /// A PostgreSQL error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A stored row or document could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A persistence error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The request carries no valid session.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// A required field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A resource not found error.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::DuplicateKey(_)) | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::Store(_) | AppError::Redis(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Store(StoreError::DuplicateKey(_)) => {
                tracing::debug!("Duplicate key rejected by store");
                "User with this email already exists.".to_string()
            }

            AppError::Store(ref e) => {
                tracing::error!("Store error: {}", e);
                "Internal server error".to_string()
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                "Internal server error".to_string()
            }

            // The reason stays in the logs; clients only learn that the session was refused.
            AppError::Unauthenticated(ref reason) => {
                tracing::warn!("Unauthenticated request: {}", reason);
                "Unauthorized".to_string()
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                msg.clone()
            }

            AppError::Conflict(ref msg) => {
                tracing::debug!("Conflict: {}", msg);
                msg.clone()
            }

            AppError::NotFound(ref msg) => {
                tracing::debug!("Not found: {}", msg);
                msg.clone()
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
