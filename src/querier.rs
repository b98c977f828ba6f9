use std::sync::Arc;

use tracing::{info, trace};

use crate::builders::{BatchInsert, Count, Delete, Insert, Select, Update};
use crate::clauses::WhereClause;
use crate::error::{MapSqlError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{ExecResult, QueryResult, RawQueryResult, Record, Row, SqlValue};

/// Helper operations over a shared driver handle.
///
/// Created from a [`MapSqlClient`](crate::MapSqlClient). Cloning is cheap and
/// every clone talks to the same connection pool, so a `Querier` can be handed
/// to as many tasks as needed.
///
/// Where-clauses are raw SQL text placed after `WHERE` (an empty string means
/// no condition). They are not escaped: pass values through `args` and `?`
/// placeholders, never by formatting them into the text.
#[derive(Clone)]
pub struct Querier {
    driver: Arc<dyn DatabaseDriver>,
    debug: bool,
}

impl Querier {
    pub(crate) fn new(driver: Arc<dyn DatabaseDriver>, debug: bool) -> Self {
        Self { driver, debug }
    }

    /// Inserts one record and returns the id the server generated for it,
    /// or 0 when the table has no generated key.
    pub async fn insert(&self, table: &str, record: &Record) -> Result<u64> {
        let (sql, params) = Insert::new(table, record).build_sql()?;
        let result = self.run_execute(&sql, &params).await?;
        Ok(result.last_insert_id.unwrap_or(0))
    }

    /// Sets the record's fields on every row matching the where-clause and
    /// returns the number of rows affected. An empty where-clause updates
    /// the whole table.
    pub async fn update(
        &self,
        table: &str,
        record: &Record,
        where_clause: &str,
        args: &[SqlValue],
    ) -> Result<u64> {
        let (sql, params) = Update::new(table, record)
            .where_(WhereClause::new(where_clause, args))
            .build_sql()?;
        Ok(self.run_execute(&sql, &params).await?.rows_affected)
    }

    /// Deletes the rows matching the where-clause and returns how many went.
    pub async fn delete(&self, table: &str, where_clause: &str, args: &[SqlValue]) -> Result<u64> {
        let (sql, params) = Delete::new(table)
            .where_(WhereClause::new(where_clause, args))
            .build_sql()?;
        Ok(self.run_execute(&sql, &params).await?.rows_affected)
    }

    /// Counts the rows matching the where-clause.
    pub async fn count(&self, table: &str, where_clause: &str, args: &[SqlValue]) -> Result<i64> {
        let (sql, params) = Count::new(table)
            .where_(WhereClause::new(where_clause, args))
            .build_sql()?;
        let raw = self.run_query(&sql, &params).await?;

        let value = raw
            .rows
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| MapSqlError::QueryFailed("COUNT(*) returned no rows".to_string()))?;
        value.as_i64().ok_or_else(|| {
            MapSqlError::QueryFailed(format!("COUNT(*) returned a non-integer: {:?}", value))
        })
    }

    /// Selects `fields` (raw text such as `*` or `id, name`) from every
    /// matching row.
    pub async fn select(
        &self,
        table: &str,
        fields: &str,
        where_clause: &str,
        args: &[SqlValue],
    ) -> Result<Vec<Row>> {
        let (sql, params) = Select::new(table, fields)
            .where_(WhereClause::new(where_clause, args))
            .build_sql()?;
        let raw = self.run_query(&sql, &params).await?;
        Ok(QueryResult::from_raw(raw).rows())
    }

    /// Like [`Querier::select`] but limited to one row.
    ///
    /// When nothing matches the result is an empty [`Row`], not an error.
    pub async fn get_one(
        &self,
        table: &str,
        fields: &str,
        where_clause: &str,
        args: &[SqlValue],
    ) -> Result<Row> {
        let (sql, params) = Select::new(table, fields)
            .where_(WhereClause::new(where_clause, args))
            .limit(1)
            .build_sql()?;
        let raw = self.run_query(&sql, &params).await?;
        Ok(QueryResult::from_raw(raw).first_or_empty())
    }

    /// Runs arbitrary SQL that returns rows.
    pub async fn query(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>> {
        let raw = self.run_query(sql, args).await?;
        Ok(QueryResult::from_raw(raw).rows())
    }

    /// Runs arbitrary SQL that does not return rows.
    pub async fn exec(&self, sql: &str, args: &[SqlValue]) -> Result<ExecResult> {
        self.run_execute(sql, args).await
    }

    /// Inserts many records with a single multi-row statement and returns the
    /// number of rows affected.
    ///
    /// Every record must have the same set of fields as the first one; values
    /// are bound in the first record's field order. A single record goes
    /// through [`Querier::insert`].
    pub async fn batch_insert(&self, table: &str, records: &[Record]) -> Result<u64> {
        let batch = BatchInsert::new(table, records);
        batch.validate()?;

        if let [record] = records {
            self.insert(table, record).await?;
            return Ok(1);
        }

        let (sql, params) = batch.build_sql()?;
        Ok(self.run_execute(&sql, &params).await?.rows_affected)
    }

    async fn run_query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        self.log_statement(sql, params);
        self.driver.query(sql, params).await
    }

    async fn run_execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecResult> {
        self.log_statement(sql, params);
        self.driver.execute(sql, params).await
    }

    fn log_statement(&self, sql: &str, params: &[SqlValue]) {
        if self.debug {
            info!(target: "mapsql::sql", sql = %sql, params = ?params, "SQL Debug");
        } else {
            trace!(target: "mapsql::sql", sql = %sql, params = ?params, "SQL Debug");
        }
    }
}
