//! Embedded schema steps for the subscription database.
//!
//! Applied versions are recorded in `schema_version`; each pending step runs
//! in its own transaction together with its version row.

use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Schema step {version} ({name}) failed: {source}")]
    Step {
        version: i64,
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("Could not read schema version: {0}")]
    Version(#[source] sqlx::Error),
}

/// One schema step compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct SchemaStep {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

/// Every step, oldest first.
pub const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "push_subscriptions",
    sql: include_str!("../../../migrations/001_push_subscriptions.sql"),
}];

/// Highest applied version, 0 for a fresh database.
pub async fn schema_version(pool: &SqlitePool) -> Result<i64, MigrationError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .execute(pool)
    .await
    .map_err(MigrationError::Version)?;

    let (version,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(pool)
        .await
        .map_err(MigrationError::Version)?;
    Ok(version)
}

/// Apply the steps newer than the recorded version. Returns how many ran.
pub async fn migrate(pool: &SqlitePool, steps: &[SchemaStep]) -> Result<usize, MigrationError> {
    let current = schema_version(pool).await?;
    let mut applied = 0;

    for step in steps.iter().filter(|step| step.version > current) {
        let failed = |source| MigrationError::Step {
            version: step.version,
            name: step.name,
            source,
        };

        let mut tx = pool.begin().await.map_err(failed)?;
        sqlx::raw_sql(step.sql).execute(&mut *tx).await.map_err(failed)?;
        sqlx::query("INSERT INTO schema_version (version, name) VALUES (?, ?)")
            .bind(step.version)
            .bind(step.name)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        tx.commit().await.map_err(failed)?;

        tracing::debug!(version = step.version, name = step.name, "schema step applied");
        applied += 1;
    }

    Ok(applied)
}
