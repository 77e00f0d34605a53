//! SQLite connection pool configuration.

use crate::Result;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

/// Pool configuration for the palette database.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Timeout for acquiring a connection.
    pub acquire_timeout: Duration,
    /// SQLite busy timeout.
    pub busy_timeout: Duration,
    pub journal_mode: SqliteJournalMode,
    /// Close idle connections and cap their lifetime. Must stay off for
    /// `:memory:`, which lives only as long as its connection.
    pub recycle_connections: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(30),
            journal_mode: SqliteJournalMode::Wal,
            recycle_connections: true,
        }
    }
}

impl PoolConfig {
    /// Single connection that never expires.
    pub fn in_memory() -> Self {
        Self {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            journal_mode: SqliteJournalMode::Memory,
            recycle_connections: false,
        }
    }

    /// Pick the configuration for a database path.
    pub fn for_path(path: &str) -> Self {
        if is_in_memory(path) {
            Self::in_memory()
        } else {
            Self::default()
        }
    }

    fn connect_options(&self, path: &str) -> Result<SqliteConnectOptions> {
        Ok(SqliteConnectOptions::from_str(path)?
            .create_if_missing(true)
            .journal_mode(self.journal_mode)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout)
            .pragma("temp_store", "memory"))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let opts = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(1)
            .acquire_timeout(self.acquire_timeout);

        if self.recycle_connections {
            opts.idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(1800))
        } else {
            opts.idle_timeout(None).max_lifetime(None)
        }
    }
}

fn is_in_memory(path: &str) -> bool {
    path == ":memory:" || path.starts_with("sqlite::memory:")
}

/// Create a pool, creating parent directories of a file database.
pub async fn create_pool(path: &str, config: PoolConfig) -> Result<super::DbPool> {
    if !is_in_memory(path) {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }

    let pool = config
        .pool_options()
        .connect_with(config.connect_options(path)?)
        .await?;

    Ok(pool)
}

/// Health check for the database connection.
pub async fn health_check(pool: &super::DbPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Connection pool usage, reported in storage diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_connections: u32,
}

pub fn get_pool_stats(pool: &super::DbPool) -> PoolStats {
    PoolStats {
        size: pool.size(),
        idle: pool.num_idle() as u32,
        max_connections: pool.options().get_max_connections(),
    }
}
