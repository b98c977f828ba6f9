use thiserror::Error;

/// Error type for mapsql operations
#[derive(Debug, Error)]
pub enum MapSqlError {
    /// Opening, pinging or closing the connection failed, or the connection
    /// was already closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The server rejected or failed to execute a statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The call arguments were rejected before anything was sent.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for mapsql operations
pub type Result<T> = std::result::Result<T, MapSqlError>;
