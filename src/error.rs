//! Error types for disk.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Common error type for disk.
#[derive(Error, Debug)]
pub enum DiskError {
    /// Database error.
    ///
    /// Generic store failure that is neither a uniqueness nor a
    /// referential violation.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// A row collides with an existing primary key or unique column.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A foreign key does not resolve.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for DiskError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => DiskError::Conflict(db_err.message().to_string()),
                ErrorKind::ForeignKeyViolation => {
                    DiskError::Integrity(db_err.message().to_string())
                }
                _ => DiskError::Database(e.to_string()),
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => DiskError::DatabaseConnection(e.to_string()),
            _ => DiskError::Database(e.to_string()),
        }
    }
}

/// Result type alias for disk operations.
pub type Result<T> = std::result::Result<T, DiskError>;
