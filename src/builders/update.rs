use crate::builders::{quote_identifier, require_table};
use crate::clauses::WhereClause;
use crate::error::{MapSqlError, Result};
use crate::types::{Record, SqlValue};

/// Builds `UPDATE <table> SET <field>=?,... [WHERE <clause>]`.
///
/// Record values come first in the parameter list, then the where-clause
/// arguments. Without a where-clause every row is updated.
pub struct Update<'a> {
    table: &'a str,
    record: &'a Record,
    where_clause: WhereClause,
}

impl<'a> Update<'a> {
    pub fn new(table: &'a str, record: &'a Record) -> Self {
        Self {
            table,
            record,
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
        if self.record.is_empty() {
            return Err(MapSqlError::InvalidParameter(format!(
                "record for `{}` has no fields",
                self.table
            )));
        }

        let mut assignments = Vec::with_capacity(self.record.len());
        let mut params = Vec::with_capacity(self.record.len() + self.where_clause.args().len());
        for (key, value) in self.record.iter() {
            assignments.push(format!("{}=?", quote_identifier(key)));
            params.push(value.clone());
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            quote_identifier(self.table),
            assignments.join(",")
        );
        self.where_clause.build_sql(&mut sql, &mut params);
        Ok((sql, params))
    }
}
