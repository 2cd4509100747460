use axum::http::StatusCode;
use tracing::error;

/// Failures surfaced by the user and weight stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("username already exists")]
    DuplicateUsername,
    #[error("record not found")]
    NotFound,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl StoreError {
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateUsername,
            _ => StoreError::Storage(err),
        }
    }
}

/// Logs the detail and hands the client a generic 500.
pub fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".into(),
    )
}
