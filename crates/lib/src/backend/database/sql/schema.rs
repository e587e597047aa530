//! SQL schema definitions and migrations.
//!
//! Contacts live in a single table keyed by an auto-assigned 64-bit id. The
//! id column is the only place the dialects differ: SQLite uses
//! `AUTOINCREMENT` (ids are never reused, even after the largest row is
//! deleted) and PostgreSQL uses a `BIGSERIAL` sequence.
//!
//! # Migration System
//!
//! Migrations are code rather than SQL files so each step can issue
//! dialect-specific statements.
//!
//! ## Adding a New Migration
//!
//! 1. Increment `SCHEMA_VERSION`
//! 2. Add a new `migrate_vN_to_vM` async function
//! 3. Add the migration to the match statement in `run_migration`

use crate::Result;
use crate::backend::errors::BackendError;

use super::{DbKind, SqlxBackend};

/// Current schema version.
///
/// Increment this when making schema changes that require migration.
pub const SCHEMA_VERSION: i64 = 1;

/// Schema version tracking table, shared by both dialects.
const CREATE_SCHEMA_VERSION: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    version BIGINT PRIMARY KEY
)";

/// Contacts table for SQLite.
const CREATE_CONTACTS_SQLITE: &str = "CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id BIGINT NOT NULL,
    name TEXT NOT NULL,
    phones_json TEXT NOT NULL,
    description TEXT
)";

/// Contacts table for PostgreSQL.
const CREATE_CONTACTS_POSTGRES: &str = "CREATE TABLE IF NOT EXISTS contacts (
    id BIGSERIAL PRIMARY KEY,
    owner_id BIGINT NOT NULL,
    name TEXT NOT NULL,
    phones_json TEXT NOT NULL,
    description TEXT
)";

/// SQL statements to create indexes.
pub const CREATE_INDEXES: &[&str] = &[
    // Keyset scans: owner equality then id range
    "CREATE INDEX IF NOT EXISTS idx_contacts_owner_id ON contacts(owner_id, id)",
];

/// Table creation statements for a dialect, in execution order.
pub fn create_tables(kind: DbKind) -> [&'static str; 2] {
    let contacts = match kind {
        DbKind::Sqlite => CREATE_CONTACTS_SQLITE,
        DbKind::Postgres => CREATE_CONTACTS_POSTGRES,
    };
    [CREATE_SCHEMA_VERSION, contacts]
}

/// Initialize the database schema.
///
/// Creates tables and indexes if they don't exist, and handles migrations
/// if the schema version has changed.
pub async fn initialize(backend: &SqlxBackend) -> Result<()> {
    let pool = backend.pool();

    for statement in create_tables(backend.kind()) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Schema creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .map_err(|e| BackendError::SqlxError {
            reason: format!("Failed to check schema version: {e}"),
            source: Some(e),
        })?;

    match row {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(SCHEMA_VERSION)
                .execute(pool)
                .await
                .map_err(|e| BackendError::SqlxError {
                    reason: format!("Failed to initialize schema version: {e}"),
                    source: Some(e),
                })?;
        }
        Some((current,)) if current < SCHEMA_VERSION => {
            migrate(backend, current, SCHEMA_VERSION).await?;
        }
        Some((current,)) if current > SCHEMA_VERSION => {
            return Err(BackendError::StorageUnavailable {
                reason: format!(
                    "database schema v{current} is newer than supported v{SCHEMA_VERSION}"
                ),
            }
            .into());
        }
        Some(_) => {}
    }

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Index creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    Ok(())
}

/// Run migrations sequentially from one schema version to another.
async fn migrate(backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    tracing::info!(from, to, "Starting SQL schema migration");

    let mut current = from;
    while current < to {
        let next = current + 1;
        run_migration(backend, current, next).await?;

        sqlx::query("UPDATE schema_version SET version = $1")
            .bind(next)
            .execute(backend.pool())
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Failed to update schema version to {next}: {e}"),
                source: Some(e),
            })?;

        tracing::info!(version = next, "Migration completed");
        current = next;
    }

    Ok(())
}

/// Execute a single migration step.
///
/// There are no migrations yet; reaching this means `SCHEMA_VERSION` was
/// bumped without adding one.
async fn run_migration(backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    let _ = backend;

    Err(BackendError::SqlxError {
        reason: format!("Unknown migration path: v{from} to v{to}"),
        source: None,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_column_per_dialect() {
        let [_, sqlite] = create_tables(DbKind::Sqlite);
        assert!(sqlite.contains("AUTOINCREMENT"));

        let [_, postgres] = create_tables(DbKind::Postgres);
        assert!(postgres.contains("BIGSERIAL"));
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let backend = SqlxBackend::sqlite_in_memory().await.unwrap();
        initialize(&backend).await.unwrap();

        let (version,): (i64,) = sqlx::query_as("SELECT version FROM schema_version")
            .fetch_one(backend.pool())
            .await
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
