//! mapsql - Insert, update, delete, select and count helpers driven by
//! field/value records instead of hand-written SQL.
//!
//! Every helper builds one parameterized statement (backtick-quoted
//! identifiers, `?` placeholders), runs it through a [`DatabaseDriver`] and
//! turns result rows into maps of column name to [`SqlValue`].
//!
//! # Example
//! ```ignore
//! use mapsql::{record, sql_args, DbConfig, MapSqlClient};
//!
//! let client = MapSqlClient::connect(&DbConfig::mysql("127.0.0.1:3306", "root", "", "shop")).await?;
//! let db = client.querier();
//!
//! let id = db.insert("users", &record! { "name" => "Alice", "age" => 30 }).await?;
//! let rows = db.select("users", "*", "name=?", &sql_args!["Alice"]).await?;
//! let user = db.get_one("users", "*", "id=?", &sql_args![id]).await?;
//! let name = mapsql::format_to_string(&user, "name");
//! ```

mod macros;

pub mod builders;
pub mod clauses;
pub mod config;
pub mod drivers;
pub mod error;
pub mod querier;
pub mod traits;
pub mod types;

mod client;

// Re-export main types for convenient access
pub use clauses::WhereClause;
pub use client::MapSqlClient;
pub use config::{DbConfig, DriverKind};
pub use error::{MapSqlError, Result};
pub use querier::Querier;
pub use traits::DatabaseDriver;
pub use types::{format_to_string, ExecResult, QueryResult, RawQueryResult, Record, Row, SqlValue};
