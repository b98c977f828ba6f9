use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ExecResult, RawQueryResult, SqlValue};

/// Trait for database driver implementations.
/// Drivers are responsible for:
/// - Connecting to the database and checking it is alive
/// - Converting SqlValue parameters to native types
/// - Executing statements and converting results to RawQueryResult
/// - Releasing every result set before returning
///
/// Statements use `?` positional placeholders and backtick-quoted identifiers.
/// Implementations must be safe to share between tasks.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Run a statement that returns rows.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult>;

    /// Run a statement that does not return rows.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecResult>;

    /// Check that the database is reachable.
    async fn ping(&self) -> Result<()>;

    /// Release the underlying connections. Fails if already closed.
    async fn close(&self) -> Result<()>;
}
