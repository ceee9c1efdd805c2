//! Centralized error handling.
//!
//! Provides a unified error type for the whole data-access layer. ORM errors
//! are propagated unchanged, except transport failures which are surfaced
//! as [`AppError::ConnectionFailure`].

use sea_orm::DbErr;
use thiserror::Error;

/// Data-access error types
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("Resource not found")]
    NotFound,

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    // Optimistic concurrency
    #[error("{entity} {id} was modified or deleted by another owner")]
    ConcurrencyConflict { entity: &'static str, id: i32 },

    // External service errors
    #[error("Database connection failed: {0}")]
    ConnectionFailure(String),

    #[error("Database error")]
    Database(DbErr),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Stable error code, used as a structured log field
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidQuery(_) => "INVALID_QUERY",
            AppError::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            AppError::ConnectionFailure(_) => "CONNECTION_FAILURE",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is an optimistic concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::ConcurrencyConflict { .. })
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                AppError::ConnectionFailure(err.to_string())
            }
            other => AppError::Database(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: &'static str, id: i32) -> Self {
        AppError::ConcurrencyConflict { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        AppError::InvalidQuery(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
