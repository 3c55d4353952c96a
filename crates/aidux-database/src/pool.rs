//! Connection pool for the integrity database.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Failed to open integrity database: {0}")]
    Creation(#[from] sqlx::Error),

    #[error("Integrity database did not answer: {0}")]
    HealthCheck(String),

    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),
}

/// Where the integrity tables live and how connections to them behave.
///
/// Every connection runs with `synchronous = FULL`, so an acknowledged audit
/// row or signature survives power loss. The file is created on first open.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// SQLite file path, or `:memory:`
    pub database_path: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// How long a caller waits for a free connection
    pub acquire_timeout: Duration,
    /// How long a write waits on another writer's lock
    pub busy_timeout: Duration,
    /// Write-ahead logging, so readers never block the appending writer
    pub wal_mode: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            database_path: "aidux.db".to_string(),
            min_connections: 1,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            wal_mode: true,
        }
    }
}

impl PoolConfig {
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::default()
    }

    /// A private in-memory database on a single connection.
    pub fn in_memory() -> Self {
        Self {
            database_path: IN_MEMORY.to_string(),
            max_connections: 1,
            wal_mode: false,
            ..Default::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == IN_MEMORY
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.database_path.trim().is_empty() {
            return Err(PoolError::InvalidConfig(
                "database_path must not be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(PoolError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(PoolError::InvalidConfig(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }
        // Each connection to `:memory:` sees its own empty database.
        if self.is_in_memory() && self.max_connections > 1 {
            return Err(PoolError::InvalidConfig(
                "in-memory databases require max_connections = 1".to_string(),
            ));
        }
        Ok(())
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, PoolError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", self.database_path))
            .map_err(|e| PoolError::InvalidConfig(e.to_string()))?
            .create_if_missing(true)
            .busy_timeout(self.busy_timeout)
            .synchronous(SqliteSynchronous::Full);

        Ok(if self.wal_mode {
            options.journal_mode(SqliteJournalMode::Wal)
        } else {
            options
        })
    }
}

#[derive(Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    pub fn database_path(mut self, path: impl Into<String>) -> Self {
        self.config.database_path = path.into();
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.config.min_connections = min;
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.config.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.config.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.config.busy_timeout = timeout;
        self
    }

    pub fn wal_mode(mut self, enabled: bool) -> Self {
        self.config.wal_mode = enabled;
        self
    }

    pub fn build(self) -> Result<PoolConfig, PoolError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Shared handle to the integrity database. Cloning shares the connections.
#[derive(Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Open the database and check that it answers.
    #[instrument(skip(config), fields(path = %config.database_path))]
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let mut options = SqlitePoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);

        // Recycling the only connection of an in-memory database would drop its contents.
        if config.is_in_memory() {
            options = options.idle_timeout(None).max_lifetime(None);
        }

        let pool = options.connect_with(config.connect_options()?).await?;
        info!(
            max_connections = config.max_connections,
            wal = config.wal_mode,
            "Integrity database opened"
        );

        let db_pool = Self { pool };
        db_pool.health_check().await?;
        Ok(db_pool)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), PoolError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PoolError::HealthCheck(e.to_string()))?;
        Ok(())
    }

    /// Close every connection. Later queries fail with `PoolClosed`.
    #[instrument(skip(self))]
    pub async fn close(&self) {
        info!("Closing integrity database");
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
