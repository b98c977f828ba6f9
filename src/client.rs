use std::sync::Arc;

use tracing::info;

use crate::config::{DbConfig, DriverKind};
use crate::drivers::{MySqlDriver, SqliteDriver};
use crate::error::Result;
use crate::querier::Querier;
use crate::traits::DatabaseDriver;

/// Main entry point for mapsql.
/// Holds a database connection pool and hands out queriers that share it.
pub struct MapSqlClient {
    driver: Arc<dyn DatabaseDriver>,
    debug: bool,
}

impl MapSqlClient {
    /// Connect using the driver named in `config`, ping the database and
    /// apply the pool limits.
    ///
    /// # Example
    /// ```ignore
    /// let config = DbConfig::mysql("127.0.0.1:3306", "root", "secret", "shop")
    ///     .with_max_open_conns(20);
    /// let client = MapSqlClient::connect(&config).await?;
    /// ```
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let driver: Arc<dyn DatabaseDriver> = match config.driver {
            DriverKind::MySql => Arc::new(MySqlDriver::connect(config).await?),
            DriverKind::Sqlite => Arc::new(SqliteDriver::open(config).await?),
        };
        info!("Connected to {}", config.connection_url());
        Ok(Self {
            driver,
            debug: config.debug,
        })
    }

    /// Create a new client with a custom driver.
    /// Useful for testing or using alternative database drivers.
    pub fn with_driver(driver: Arc<dyn DatabaseDriver>, debug: bool) -> Self {
        Self { driver, debug }
    }

    /// Create a Querier for running helper operations.
    pub fn querier(&self) -> Querier {
        Querier::new(Arc::clone(&self.driver), self.debug)
    }

    /// Check that the database is still reachable.
    pub async fn ping(&self) -> Result<()> {
        self.driver.ping().await
    }

    /// Release the connection pool. Queriers created from this client fail
    /// afterwards, and closing twice is an error.
    pub async fn close(&self) -> Result<()> {
        self.driver.close().await
    }
}
