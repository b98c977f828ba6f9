use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder, Params, Pool, PoolConstraints, PoolOpts, Value};
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{MapSqlError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{ExecResult, RawQueryResult, SqlValue};

/// mysql_async keeps this many connections when no idle limit is given.
const DEFAULT_POOL_MIN: usize = 10;
/// mysql_async opens at most this many connections when no limit is given.
const DEFAULT_POOL_MAX: usize = 100;

/// MySQL driver implementation using a mysql_async connection pool.
pub struct MySqlDriver {
    pool: Mutex<Option<Pool>>,
}

impl MySqlDriver {
    /// Opens a pool for `config` and checks the server answers a ping.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let (host, port) = config.host_port()?;
        let (min, max) = pool_limits(config.max_open_conns, config.max_idle_conns);
        info!(
            "Connecting to {} (max_open_conns={}, max_idle_conns={})",
            config.connection_url(),
            config.max_open_conns,
            config.max_idle_conns
        );
        debug!("MySQL pool constraints: min={}, max={}", min, max);

        let constraints = PoolConstraints::new(min, max).unwrap_or_default();
        let opts = OptsBuilder::default()
            .ip_or_hostname(host)
            .tcp_port(port)
            .user(non_empty(&config.user))
            .pass(non_empty(&config.password))
            .db_name(non_empty(&config.db_name))
            .pool_opts(PoolOpts::default().with_constraints(constraints));

        let driver = Self {
            pool: Mutex::new(Some(Pool::new(Opts::from(opts)))),
        };
        if let Err(e) = driver.ping().await {
            // the pool is useless at this point; a failed disconnect changes nothing
            let _ = driver.close().await;
            return Err(e);
        }
        Ok(driver)
    }

    async fn conn(&self) -> Result<Conn> {
        let pool = self
            .pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(closed)?;
        pool.get_conn()
            .await
            .map_err(|e| MapSqlError::ConnectionFailed(e.to_string()))
    }
}

#[async_trait]
impl DatabaseDriver for MySqlDriver {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        let mut conn = self.conn().await?;

        // Without arguments the text protocol is used, as most MySQL clients do.
        let rows: Vec<mysql_async::Row> = if params.is_empty() {
            conn.query::<mysql_async::Row, _>(sql).await
        } else {
            conn.exec::<mysql_async::Row, _, _>(sql, to_params(params)).await
        }
        .map_err(|e| MapSqlError::QueryFailed(e.to_string()))?;

        let columns: Vec<String> = match rows.first() {
            Some(row) => row
                .columns_ref()
                .iter()
                .map(|c| c.name_str().into_owned())
                .collect(),
            None => Vec::new(),
        };

        let result_rows = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| from_mysql_value(row.as_ref(i).cloned().unwrap_or(Value::NULL)))
                    .collect()
            })
            .collect();

        Ok(RawQueryResult::new(columns, result_rows))
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecResult> {
        let mut conn = self.conn().await?;
        let outcome = if params.is_empty() {
            conn.query_drop(sql).await
        } else {
            conn.exec_drop(sql, to_params(params)).await
        };
        outcome.map_err(|e| MapSqlError::QueryFailed(e.to_string()))?;

        Ok(ExecResult::new(conn.affected_rows(), conn.last_insert_id()))
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        conn.ping()
            .await
            .map_err(|e| MapSqlError::ConnectionFailed(e.to_string()))
    }

    async fn close(&self) -> Result<()> {
        let pool = self
            .pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(closed)?;
        info!("Disconnecting MySQL pool");
        pool.disconnect()
            .await
            .map_err(|e| MapSqlError::ConnectionFailed(e.to_string()))
    }
}

fn closed() -> MapSqlError {
    MapSqlError::ConnectionFailed("connection is closed".to_string())
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Maps open/idle limits onto pool (min, max). 0 keeps the driver default and
/// the idle count never exceeds the open limit.
fn pool_limits(max_open: usize, max_idle: usize) -> (usize, usize) {
    let max = if max_open > 0 { max_open } else { DEFAULT_POOL_MAX };
    let min = if max_idle > 0 { max_idle } else { DEFAULT_POOL_MIN };
    (min.min(max), max)
}

fn to_params(params: &[SqlValue]) -> Params {
    Params::Positional(params.iter().map(to_mysql_value).collect())
}

fn to_mysql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::NULL,
        SqlValue::Bool(b) => Value::Int(i64::from(*b)),
        SqlValue::Int(i) => Value::Int(*i),
        SqlValue::UInt(u) => Value::UInt(*u),
        SqlValue::Float(f) => Value::Double(*f),
        SqlValue::Text(s) => Value::Bytes(s.clone().into_bytes()),
        SqlValue::Bytes(b) => Value::Bytes(b.clone()),
    }
}

fn from_mysql_value(value: Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Bytes(b) => SqlValue::Bytes(b),
        Value::Int(i) => SqlValue::Int(i),
        Value::UInt(u) => SqlValue::UInt(u),
        Value::Float(f) => SqlValue::Float(f64::from(f)),
        Value::Double(d) => SqlValue::Float(d),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            SqlValue::Text(format_date(year, month, day, hour, minute, second, micros))
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            SqlValue::Text(format_time(negative, days, hours, minutes, seconds, micros))
        }
    }
}

fn format_date(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8, micros: u32) -> String {
    let date = format!("{:04}-{:02}-{:02}", year, month, day);
    if hour == 0 && minute == 0 && second == 0 && micros == 0 {
        return date;
    }
    let mut out = format!("{} {:02}:{:02}:{:02}", date, hour, minute, second);
    if micros > 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}

fn format_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let total_hours = u64::from(days) * 24 + u64::from(hours);
    let mut out = format!(
        "{}{:02}:{:02}:{:02}",
        if negative { "-" } else { "" },
        total_hours,
        minutes,
        seconds
    );
    if micros > 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}
