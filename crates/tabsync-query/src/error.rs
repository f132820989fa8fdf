//! Query error types

use thiserror::Error;

/// Result type for query operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Errors that can occur while registering frames or running SQL
#[derive(Debug, Error)]
pub enum QueryError {
    /// Any failure reported by the SQL engine (syntax, unknown table, ...)
    #[error("SQL error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A binding name that cannot be used as a table name
    #[error("Invalid table name: {0:?}")]
    InvalidName(String),

    /// A frame with no columns cannot be registered as a table
    #[error("Frame bound to '{0}' has no columns")]
    EmptyFrame(String),

    #[error("Core error: {0}")]
    Core(#[from] tabsync_core::Error),
}
