use crate::builders::{placeholders, quote_identifier, require_table};
use crate::error::{MapSqlError, Result};
use crate::types::{Record, SqlValue};

/// Builds `INSERT INTO <table> (<fields>) VALUES (?,...)` for one record.
pub struct Insert<'a> {
    table: &'a str,
    record: &'a Record,
}

impl<'a> Insert<'a> {
    pub fn new(table: &'a str, record: &'a Record) -> Self {
        Self { table, record }
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

        let mut columns = Vec::with_capacity(self.record.len());
        let mut params = Vec::with_capacity(self.record.len());
        for (key, value) in self.record.iter() {
            columns.push(quote_identifier(key));
            params.push(value.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(self.table),
            columns.join(","),
            placeholders(params.len())
        );
        Ok((sql, params))
    }
}

/// Builds one multi-row `INSERT INTO <table> (<fields>) VALUES (...),(...)`.
///
/// The first record's fields define the column list. Every other record must
/// carry the same set of fields, in any order.
pub struct BatchInsert<'a> {
    table: &'a str,
    records: &'a [Record],
}

impl<'a> BatchInsert<'a> {
    pub fn new(table: &'a str, records: &'a [Record]) -> Self {
        Self { table, records }
    }

    /// Checks the arguments without building anything.
    pub fn validate(&self) -> Result<()> {
        require_table(self.table)?;
        let first = self.records.first().ok_or_else(|| {
            MapSqlError::InvalidParameter("batch insert needs at least one record".to_string())
        })?;
        if first.is_empty() {
            return Err(MapSqlError::InvalidParameter(format!(
                "record for `{}` has no fields",
                self.table
            )));
        }
        if let Some(index) = self.records.iter().position(|r| !r.same_fields(first)) {
            return Err(MapSqlError::InvalidParameter(format!(
                "record {} does not have the same fields as record 0",
                index
            )));
        }
        Ok(())
    }

    /// Build the SQL query string and parameters.
    pub fn build_sql(&self) -> Result<(String, Vec<SqlValue>)> {
        self.validate()?;
        let columns: Vec<&str> = self.records[0].keys().collect();

        let tuple = format!("({})", placeholders(columns.len()));
        let tuples = vec![tuple.as_str(); self.records.len()].join(",");

        let mut params = Vec::with_capacity(columns.len() * self.records.len());
        for record in self.records {
            for column in &columns {
                params.push(record.get(column).cloned().unwrap_or(SqlValue::Null));
            }
        }

        let quoted: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            quote_identifier(self.table),
            quoted.join(","),
            tuples
        );
        Ok((sql, params))
    }
}
