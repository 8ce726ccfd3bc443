//! Error types for tm-db

use thiserror::Error;

/// Database session errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] Statement execution failed: {0}")]
    ExecutionError(String),

    /// Session used after it was closed (D003)
    #[error("[D003] Session is closed")]
    Closed,

    /// Mutex poisoned (D004)
    #[error("[D004] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Value returned by the database could not be interpreted (D005)
    #[error("[D005] Unexpected value: {0}")]
    UnexpectedValue(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}
