//! Database error types

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Transaction error
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Stored value could not be mapped to a domain type
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),

    /// Settings could not be loaded
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound(err.to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionFailed(err.to_string())
            }
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::DuplicateEntry(err.to_string())
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<DatabaseError> for PortError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => PortError::not_found("row", msg),
            DatabaseError::DuplicateEntry(msg) => PortError::conflict(msg),
            DatabaseError::ConnectionFailed(msg) => PortError::connection(msg),
            other => PortError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error: DatabaseError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, DatabaseError::NotFound(_)));

        let port: PortError = error.into();
        assert!(port.is_not_found());
    }

    #[test]
    fn test_connection_failure_is_transient() {
        let port: PortError = DatabaseError::ConnectionFailed("pool exhausted".into()).into();
        assert!(port.is_transient());
    }
}
