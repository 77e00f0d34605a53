//! Database layer for Swatchbook.
//!
//! SQLite connection pooling and schema setup for the structured storage
//! backend. Palette queries live in [`crate::storage::sqlite`].

mod pool;

pub use pool::{create_pool, get_pool_stats, health_check, PoolConfig, PoolStats};

use crate::Result;
use tracing::info;

/// Type alias for the SQLite connection pool.
pub type DbPool = sqlx::SqlitePool;

/// Initialize the database connection pool.
///
/// `:memory:` databases get a single long-lived connection so every query
/// sees the same database.
pub async fn init_pool(path: &str) -> Result<DbPool> {
    let pool = create_pool(path, PoolConfig::for_path(path)).await?;

    info!("Database pool initialized: {}", path);

    Ok(pool)
}

/// Initialize the database schema.
///
/// Applies the complete schema from schema.sql. Uses IF NOT EXISTS
/// clauses so it's safe to run multiple times.
pub async fn initialize_schema(pool: &DbPool) -> Result<()> {
    let schema = include_str!("../../schema.sql");

    info!("Initializing database schema");

    for statement in schema.split(';') {
        // Strip comment lines, keeping only actual SQL
        let clean_stmt: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let clean_stmt = clean_stmt.trim();
        if clean_stmt.is_empty() {
            continue;
        }
        sqlx::query(clean_stmt).execute(pool).await?;
    }

    info!("Database schema initialized successfully");

    Ok(())
}
