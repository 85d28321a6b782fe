//! Error types for ks-db

use thiserror::Error;

/// CSV ingestion errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Input file missing (D003)
    #[error("[D003] CSV file not found: {0}")]
    FileNotFound(String),

    /// No configured encoding could decode the file (D004)
    #[error("[D004] CSV load failed for '{path}' (tried {tried}): {message}")]
    CsvError {
        path: String,
        tried: String,
        message: String,
    },

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}
