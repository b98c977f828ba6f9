use crate::builders::{quote_identifier, require_table};
use crate::clauses::WhereClause;
use crate::error::Result;
use crate::types::SqlValue;

/// Builds `DELETE FROM <table> [WHERE <clause>]`.
pub struct Delete<'a> {
    table: &'a str,
    where_clause: WhereClause,
}

impl<'a> Delete<'a> {
    pub fn new(table: &'a str) -> Self {
        Self {
            table,
            where_clause: WhereClause::default(),
        }
    }

    /// Add a WHERE clause to the statement.
    pub fn where_(mut self, clause: WhereClause) -> Self {
        self.where_clause = clause;
        self
    }

    /// Build the SQL query string and parameters.
    pub fn build_sql(&self) -> Result<(String, Vec<SqlValue>)> {
        require_table(self.table)?;
        let mut sql = format!("DELETE FROM {}", quote_identifier(self.table));
        let mut params = Vec::new();
        self.where_clause.build_sql(&mut sql, &mut params);
        Ok((sql, params))
    }
}
