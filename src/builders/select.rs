use crate::builders::{quote_identifier, require_table};
use crate::clauses::WhereClause;
use crate::error::Result;
use crate::types::SqlValue;

/// Builds `SELECT <fields> FROM <table> [WHERE <clause>] [LIMIT n]`.
///
/// `fields` is raw SQL text such as `*` or `id, name`.
pub struct Select<'a> {
    table: &'a str,
    fields: &'a str,
    where_clause: WhereClause,
    limit: Option<u64>,
}

impl<'a> Select<'a> {
    pub fn new(table: &'a str, fields: &'a str) -> Self {
        Self {
            table,
            fields,
            where_clause: WhereClause::default(),
            limit: None,
        }
    }

    /// Add a WHERE clause to the query.
    pub fn where_(mut self, clause: WhereClause) -> Self {
        self.where_clause = clause;
        self
    }

    /// Add a LIMIT to the query.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Build the SQL query string and parameters.
    pub fn build_sql(&self) -> Result<(String, Vec<SqlValue>)> {
        require_table(self.table)?;
        let mut sql = String::with_capacity(256);
        let mut params = Vec::new();

        // SELECT clause
        sql.push_str("SELECT ");
        let fields = self.fields.trim();
        sql.push_str(if fields.is_empty() { "*" } else { fields });

        // FROM clause
        sql.push_str(" FROM ");
        sql.push_str(&quote_identifier(self.table));

        // WHERE clause
        self.where_clause.build_sql(&mut sql, &mut params);

        // LIMIT clause
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }

        Ok((sql, params))
    }
}

/// Builds `SELECT COUNT(*) AS total FROM <table> [WHERE <clause>]`.
pub struct Count<'a> {
    table: &'a str,
    where_clause: WhereClause,
}

impl<'a> Count<'a> {
    pub fn new(table: &'a str) -> Self {
        Self {
            table,
            where_clause: WhereClause::default(),
        }
    }

    /// Add a WHERE clause to the query.
    pub fn where_(mut self, clause: WhereClause) -> Self {
        self.where_clause = clause;
        self
    }

    /// Build the SQL query string and parameters.
    pub fn build_sql(&self) -> Result<(String, Vec<SqlValue>)> {
        require_table(self.table)?;
        let mut sql = format!(
            "SELECT COUNT(*) AS total FROM {}",
            quote_identifier(self.table)
        );
        let mut params = Vec::new();
        self.where_clause.build_sql(&mut sql, &mut params);
        Ok((sql, params))
    }
}
