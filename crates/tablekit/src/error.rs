//! Error types for tablekit

use thiserror::Error;

/// Result type alias for tablekit operations
pub type TableResult<T> = Result<T, TableError>;

/// Error types for table operations
#[derive(Debug, Error)]
pub enum TableError {
    /// Malformed input (operands, identifiers, empty mutations)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backing table does not exist
    #[error("Table for {0} does not exist in the database")]
    TableNotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Failure reported by the host database object
    #[error("Host error: {0}")]
    Host(String),

    /// Database connection error
    #[cfg(feature = "postgres")]
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[cfg(feature = "postgres")]
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "postgres")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl TableError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a host error
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a missing-table error
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, Self::TableNotFound(_))
    }
}

#[cfg(feature = "postgres")]
impl From<deadpool_postgres::PoolError> for TableError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
