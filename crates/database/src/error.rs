//! Database error types.

use risk_core::AlertError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before reaching the database
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Stored or submitted geometry could not be parsed
    #[error("{0}")]
    Geometry(AlertError),
}

impl From<DatabaseError> for AlertError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Geometry(inner) => inner,
            other => AlertError::StoreUnavailable(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
