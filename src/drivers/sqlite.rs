use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rusqlite::{params_from_iter, types::Value, Connection};
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{MapSqlError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{ExecResult, RawQueryResult, SqlValue};

/// Embedded SQLite driver implementation using rusqlite.
///
/// SQLite accepts the same backtick identifiers and `?` placeholders as MySQL.
/// A single connection is shared; calls are serialized and run on the
/// blocking thread pool.
pub struct SqliteDriver {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteDriver {
    /// Opens the database file named by `config.addr`, or an in-memory
    /// database for `:memory:` or an empty address.
    pub async fn open(config: &DbConfig) -> Result<Self> {
        let path = config.addr.trim().to_string();
        info!("Opening {}", config.connection_url());
        if config.max_open_conns > 0 || config.max_idle_conns > 0 {
            debug!("SQLite uses a single connection, pool limits are ignored");
        }

        let conn = tokio::task::spawn_blocking(move || {
            if path.is_empty() || path == ":memory:" {
                Connection::open_in_memory()
            } else {
                Connection::open(&path)
            }
        })
        .await
        .map_err(|e| MapSqlError::ConnectionFailed(e.to_string()))?
        .map_err(|e| MapSqlError::ConnectionFailed(e.to_string()))?;

        let driver = Self::from_connection(conn);
        driver.ping().await?;
        Ok(driver)
    }

    /// Wraps an already opened connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            let conn = guard.as_ref().ok_or_else(closed)?;
            f(conn)
        })
        .await
        .map_err(|e| MapSqlError::QueryFailed(e.to_string()))?
    }
}

#[async_trait]
impl DatabaseDriver for SqliteDriver {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        let sql = sql.to_string();
        let params = to_sqlite_values(params)?;

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql).map_err(query_failed)?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();

            let mut result_rows = Vec::new();
            let mut rows = stmt.query(params_from_iter(params.iter())).map_err(query_failed)?;
            while let Some(row) = rows.next().map_err(query_failed)? {
                let mut values = Vec::with_capacity(columns.len());
                for i in 0..columns.len() {
                    let value: Value = row.get(i).map_err(query_failed)?;
                    values.push(from_sqlite_value(value));
                }
                result_rows.push(values);
            }

            Ok(RawQueryResult::new(columns, result_rows))
        })
        .await
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecResult> {
        let sql = sql.to_string();
        let params = to_sqlite_values(params)?;

        self.with_conn(move |conn| {
            let changed = conn
                .execute(&sql, params_from_iter(params.iter()))
                .map_err(query_failed)?;
            // last_insert_rowid survives later statements; only report it for inserts
            let last_insert_id = if is_insert(&sql) {
                u64::try_from(conn.last_insert_rowid()).ok()
            } else {
                None
            };
            Ok(ExecResult::new(changed as u64, last_insert_id))
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(|e| MapSqlError::ConnectionFailed(e.to_string()))
        })
        .await
    }

    async fn close(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .ok_or_else(closed)?;
            info!("Closing SQLite connection");
            conn.close()
                .map_err(|(_, e)| MapSqlError::ConnectionFailed(e.to_string()))
        })
        .await
        .map_err(|e| MapSqlError::ConnectionFailed(e.to_string()))?
    }
}

fn closed() -> MapSqlError {
    MapSqlError::ConnectionFailed("connection is closed".to_string())
}

fn query_failed(e: rusqlite::Error) -> MapSqlError {
    MapSqlError::QueryFailed(e.to_string())
}

fn is_insert(sql: &str) -> bool {
    let head = sql.trim_start();
    ["INSERT", "REPLACE"].iter().any(|kw| {
        head.get(..kw.len())
            .is_some_and(|word| word.eq_ignore_ascii_case(kw))
    })
}

fn to_sqlite_values(params: &[SqlValue]) -> Result<Vec<Value>> {
    params.iter().map(to_sqlite_value).collect()
}

fn to_sqlite_value(value: &SqlValue) -> Result<Value> {
    Ok(match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::Int(i) => Value::Integer(*i),
        SqlValue::UInt(u) => Value::Integer(i64::try_from(*u).map_err(|_| {
            MapSqlError::InvalidParameter(format!("{} does not fit a SQLite integer", u))
        })?),
        SqlValue::Float(f) => Value::Real(*f),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Bytes(b) => Value::Blob(b.clone()),
    })
}

fn from_sqlite_value(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Int(i),
        Value::Real(f) => SqlValue::Float(f),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Bytes(b),
    }
}
