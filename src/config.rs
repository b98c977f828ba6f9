use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{MapSqlError, Result};

const ENV_PREFIX: &str = "MAPSQL_";
const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Which database client library backs a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    #[default]
    MySql,
    Sqlite,
}

impl FromStr for DriverKind {
    type Err = MapSqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(DriverKind::MySql),
            "sqlite" | "sqlite3" => Ok(DriverKind::Sqlite),
            other => Err(MapSqlError::InvalidParameter(format!(
                "unsupported driver: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::MySql => f.write_str("mysql"),
            DriverKind::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Connection settings.
///
/// `addr` is `host[:port]` for MySQL and a file path (or `:memory:`) for
/// SQLite. Pool limits of 0 leave the driver defaults in place.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DbConfig {
    #[serde(default)]
    pub driver: DriverKind,
    pub addr: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub db_name: String,
    #[serde(default)]
    pub max_open_conns: usize,
    #[serde(default)]
    pub max_idle_conns: usize,
    /// Log every statement and its parameters at info level.
    #[serde(default)]
    pub debug: bool,
}

impl DbConfig {
    pub fn mysql(
        addr: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        db_name: impl Into<String>,
    ) -> Self {
        Self {
            driver: DriverKind::MySql,
            addr: addr.into(),
            user: user.into(),
            password: password.into(),
            db_name: db_name.into(),
            ..Self::default()
        }
    }

    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            driver: DriverKind::Sqlite,
            addr: path.into(),
            ..Self::default()
        }
    }

    pub fn with_max_open_conns(mut self, n: usize) -> Self {
        self.max_open_conns = n;
        self
    }

    pub fn with_max_idle_conns(mut self, n: usize) -> Self {
        self.max_idle_conns = n;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Loads the settings from `MAPSQL_*` environment variables, reading a
    /// `.env` file first if one exists.
    ///
    /// `MAPSQL_ADDR` is required. `MAPSQL_DRIVER` defaults to `mysql`.
    pub fn from_env() -> Result<Self> {
        // dotenvy::var loads .env once; a missing file leaves the process environment
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Builds the settings from any key lookup, using the same keys as
    /// [`DbConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        let driver = match get("DRIVER") {
            Some(raw) => raw.parse()?,
            None => DriverKind::default(),
        };
        let addr = get("ADDR").ok_or_else(|| {
            MapSqlError::InvalidParameter(format!("{}ADDR must be set", ENV_PREFIX))
        })?;

        Ok(Self {
            driver,
            addr,
            user: get("USER").unwrap_or_default(),
            password: get("PASSWORD").unwrap_or_default(),
            db_name: get("DB_NAME").unwrap_or_default(),
            max_open_conns: parse_count("MAX_OPEN_CONNS", get("MAX_OPEN_CONNS"))?,
            max_idle_conns: parse_count("MAX_IDLE_CONNS", get("MAX_IDLE_CONNS"))?,
            debug: parse_flag("DEBUG", get("DEBUG"))?,
        })
    }

    /// Driver-specific connection string with the password redacted.
    pub fn connection_url(&self) -> String {
        match self.driver {
            DriverKind::MySql => format!("mysql://{}@{}/{}", self.user, self.addr, self.db_name),
            DriverKind::Sqlite => format!("sqlite://{}", self.addr),
        }
    }

    /// Splits a MySQL `addr` into host and port.
    pub fn host_port(&self) -> Result<(String, u16)> {
        split_host_port(&self.addr)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("driver", &self.driver)
            .field("addr", &self.addr)
            .field("user", &self.user)
            .field("password", &"***")
            .field("db_name", &self.db_name)
            .field("max_open_conns", &self.max_open_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("debug", &self.debug)
            .finish()
    }
}

fn parse_count(name: &str, raw: Option<String>) -> Result<usize> {
    match raw {
        None => Ok(0),
        Some(raw) => raw.trim().parse().map_err(|_| {
            MapSqlError::InvalidParameter(format!("{}{} is not a number: {}", ENV_PREFIX, name, raw))
        }),
    }
}

fn parse_flag(name: &str, raw: Option<String>) -> Result<bool> {
    match raw.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "" | "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(MapSqlError::InvalidParameter(format!(
                "{}{} is not a boolean: {}",
                ENV_PREFIX, name, v
            ))),
        },
    }
}

fn split_host_port(addr: &str) -> Result<(String, u16)> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Err(MapSqlError::InvalidParameter("address is empty".to_string()));
    }

    // [v6]:port or [v6]
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(|| {
            MapSqlError::InvalidParameter(format!("malformed address: {}", addr))
        })?;
        let port = match tail.strip_prefix(':') {
            Some(port) => parse_port(addr, port)?,
            None if tail.is_empty() => DEFAULT_MYSQL_PORT,
            None => {
                return Err(MapSqlError::InvalidParameter(format!(
                    "malformed address: {}",
                    addr
                )))
            }
        };
        return Ok((host.to_string(), port));
    }

    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => Ok((host.to_string(), parse_port(addr, port)?)),
        // no port, or a bare IPv6 address
        _ => Ok((addr.to_string(), DEFAULT_MYSQL_PORT)),
    }
}

fn parse_port(addr: &str, port: &str) -> Result<u16> {
    port.parse()
        .map_err(|_| MapSqlError::InvalidParameter(format!("malformed port in address: {}", addr)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = DbConfig::from_lookup(lookup(&[
            ("MAPSQL_ADDR", "db.local:3307"),
            ("MAPSQL_USER", "app"),
            ("MAPSQL_PASSWORD", "secret"),
            ("MAPSQL_DB_NAME", "shop"),
            ("MAPSQL_MAX_OPEN_CONNS", "20"),
            ("MAPSQL_DEBUG", "true"),
        ]))
        .unwrap();

        assert_eq!(config.driver, DriverKind::MySql);
        assert_eq!(config.addr, "db.local:3307");
        assert_eq!(config.max_open_conns, 20);
        assert_eq!(config.max_idle_conns, 0);
        assert!(config.debug);
        assert_eq!(config.connection_url(), "mysql://app@db.local:3307/shop");
    }

    #[test]
    fn test_from_lookup_requires_addr() {
        let err = DbConfig::from_lookup(lookup(&[("MAPSQL_USER", "app")])).unwrap_err();
        assert!(matches!(err, MapSqlError::InvalidParameter(_)));
    }

    #[test]
    fn test_from_lookup_rejects_bad_numbers() {
        let err = DbConfig::from_lookup(lookup(&[
            ("MAPSQL_ADDR", "localhost"),
            ("MAPSQL_MAX_IDLE_CONNS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, MapSqlError::InvalidParameter(_)));
    }

    #[test]
    fn test_driver_kind_parse() {
        assert_eq!("MySQL".parse::<DriverKind>().unwrap(), DriverKind::MySql);
        assert_eq!("sqlite3".parse::<DriverKind>().unwrap(), DriverKind::Sqlite);
        assert!("oracle".parse::<DriverKind>().is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = DbConfig::mysql("localhost", "root", "hunter2", "test");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("localhost").unwrap(), ("localhost".to_string(), 3306));
        assert_eq!(split_host_port("10.0.0.2:3310").unwrap(), ("10.0.0.2".to_string(), 3310));
        assert_eq!(split_host_port("[::1]:3307").unwrap(), ("::1".to_string(), 3307));
        assert_eq!(split_host_port("[::1]").unwrap(), ("::1".to_string(), 3306));
        assert!(split_host_port("localhost:abc").is_err());
        assert!(split_host_port("").is_err());
    }
}
