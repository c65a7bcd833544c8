//! Error types for the persistence layer

use thiserror::Error;

/// Errors that can occur when working with the database
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A write hit a unique constraint (double booking, duplicate token).
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// A stored value could not be turned back into its domain type.
    #[error("Corrupt row: {0}")]
    DecodeError(String),

    /// A row that must exist does not.
    #[error("Missing row: {0}")]
    Missing(String),
}

impl DbError {
    /// Classify a failed write: unique-index violations become [`DbError::Conflict`],
    /// everything else a [`DbError::QueryError`].
    pub fn from_write(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            DbError::Conflict(err.to_string())
        } else {
            DbError::QueryError(err.to_string())
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.is_unique_violation() {
                return true;
            }
            // The Any driver does not always carry the error kind through.
            let message = db_err.message();
            message.contains("UNIQUE constraint failed") || message.contains("duplicate key")
        }
        _ => false,
    }
}
