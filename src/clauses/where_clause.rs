use crate::types::SqlValue;

/// A WHERE condition: raw SQL text written by the caller plus the positional
/// arguments for its `?` placeholders.
///
/// The text is emitted verbatim after the WHERE keyword and is never escaped,
/// so it must not be built from untrusted input. Values belong in the
/// arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    sql: String,
    args: Vec<SqlValue>,
}

impl WhereClause {
    /// Creates a condition with its arguments.
    pub fn new(sql: impl Into<String>, args: &[SqlValue]) -> Self {
        Self {
            sql: sql.into(),
            args: args.to_vec(),
        }
    }

    /// Creates a condition without arguments.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Appends one more positional argument.
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.args.push(value.into());
        self
    }

    /// True when there is no condition text. Arguments are still bound in
    /// that case, which lets the server report a placeholder mismatch.
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Appends ` WHERE <text>` to `sql` when the text is non-empty and pushes
    /// the arguments onto `params`.
    pub fn build_sql(&self, sql: &mut String, params: &mut Vec<SqlValue>) {
        if !self.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.sql);
        }
        params.extend(self.args.iter().cloned());
    }
}

impl From<&str> for WhereClause {
    fn from(sql: &str) -> Self {
        WhereClause::raw(sql)
    }
}

impl From<String> for WhereClause {
    fn from(sql: String) -> Self {
        WhereClause::raw(sql)
    }
}
