use std::collections::HashMap;

use crate::types::SqlValue;

/// Driver-agnostic raw result from a query that returns rows.
/// Values keep the type the driver produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order
    pub rows: Vec<Vec<SqlValue>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Identifier generated by the server for an inserted row, if any.
    pub last_insert_id: Option<u64>,
}

impl ExecResult {
    pub fn new(rows_affected: u64, last_insert_id: Option<u64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }
}

/// A single row result from a query, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, SqlValue>,
}

impl Row {
    /// Creates a new Row from column names and values.
    pub(crate) fn new(columns: &[String], values: Vec<SqlValue>) -> Self {
        let values = columns
            .iter()
            .zip(values)
            .map(|(col, val)| (col.clone(), val))
            .collect();
        Self { values }
    }

    /// An empty row, returned by `get_one` when nothing matched.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Gets a value by column name.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values.get(column)
    }

    /// Gets a column rendered as text. See [`format_to_string`].
    pub fn get_string(&self, column: &str) -> String {
        format_to_string(self, column)
    }

    /// Returns all column names in this row.
    pub fn columns(&self) -> Vec<&str> {
        self.values.keys().map(|s| s.as_str()).collect()
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_map(self) -> HashMap<String, SqlValue> {
        self.values
    }
}

impl From<HashMap<String, SqlValue>> for Row {
    fn from(values: HashMap<String, SqlValue>) -> Self {
        Self { values }
    }
}

/// Renders a column as text.
///
/// Byte values are decoded as UTF-8, replacing invalid sequences. An absent
/// column or a NULL value yields an empty string.
pub fn format_to_string(row: &Row, key: &str) -> String {
    match row.get(key) {
        None | Some(SqlValue::Null) => String::new(),
        Some(SqlValue::Bytes(b)) => String::from_utf8_lossy(b).into_owned(),
        Some(SqlValue::Text(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Materialized result of a query, containing zero or more rows.
#[derive(Debug)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl QueryResult {
    /// Creates a QueryResult from a RawQueryResult, one map per row.
    pub fn from_raw(raw: RawQueryResult) -> Self {
        let rows = raw
            .rows
            .into_iter()
            .map(|values| Row::new(&raw.columns, values))
            .collect();
        Self {
            columns: raw.columns,
            rows,
        }
    }

    /// Returns the first row, or an empty row if there is none.
    pub fn first_or_empty(self) -> Row {
        self.rows.into_iter().next().unwrap_or_default()
    }

    /// Returns all rows from the result.
    pub fn rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns a reference to the rows without consuming the result.
    pub fn rows_ref(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the column names from this result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows in this result.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this result contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
