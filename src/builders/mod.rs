//! Statement builders.
//!
//! Each builder turns a table name plus records or a where-clause into SQL
//! text and the matching positional parameter list. Both are produced in the
//! same pass, so placeholder `n` always binds parameter `n`.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::Delete;
pub use insert::{BatchInsert, Insert};
pub use select::{Count, Select};
pub use update::Update;

use crate::error::{MapSqlError, Result};

/// Wraps an identifier in backticks, doubling any backtick inside it.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

pub(crate) fn require_table(table: &str) -> Result<()> {
    if table.trim().is_empty() {
        return Err(MapSqlError::InvalidParameter(
            "table name is empty".to_string(),
        ));
    }
    Ok(())
}

/// `?,?,?` with `n` placeholders.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}
