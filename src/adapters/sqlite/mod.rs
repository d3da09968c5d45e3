//! SQLite persistence for push subscriptions.

pub mod connection;
pub mod migrations;
pub mod subscription_repository;

pub use connection::{open_file, open_in_memory, ConnectionError, PoolSettings};
pub use migrations::{migrate, schema_version, MigrationError, SchemaStep, SCHEMA_STEPS};
pub use subscription_repository::SqliteSubscriptionStore;

use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// Open the database at `path` and bring its schema up to date.
pub async fn initialize_database(path: &str) -> Result<SqlitePool, DatabaseError> {
    let pool = open_file(path, &PoolSettings::default()).await?;
    let applied = migrate(&pool, SCHEMA_STEPS).await?;
    if applied > 0 {
        tracing::info!(path, applied, "database migrations applied");
    }
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = open_in_memory().await?;
    migrate(&pool, SCHEMA_STEPS).await?;
    Ok(pool)
}
