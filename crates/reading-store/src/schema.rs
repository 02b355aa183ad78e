//! Schema definitions and migration utilities.
//!
//! This module provides embedded SQL schema definitions and utilities
//! for managing database migrations.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for users, sessions and reading data (001_reading_schema.sql).
pub const READING_MIGRATION: &str = include_str!("../../../migrations/001_reading_schema.sql");

/// Embedded migration SQL for tags and tag relations (002_tags.sql).
pub const TAGS_MIGRATION: &str = include_str!("../../../migrations/002_tags.sql");

/// Embedded migration SQL for export history and templates (003_exports.sql).
pub const EXPORTS_MIGRATION: &str = include_str!("../../../migrations/003_exports.sql");

/// Migrations in application order, with the file name used in logs.
const MIGRATIONS: [(&str, &str); 3] = [
    ("001_reading_schema.sql", READING_MIGRATION),
    ("002_tags.sql", TAGS_MIGRATION),
    ("003_exports.sql", EXPORTS_MIGRATION),
];

/// Run all pending migrations against the database.
///
/// This function is idempotent - it can be run multiple times safely.
/// Migrations check for existing objects before creating them.
///
/// # Errors
///
/// Returns an error if any migration fails to execute.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    for (name, sql) in MIGRATIONS {
        tracing::debug!("Running migration ({})...", name);
        sqlx::raw_sql(sql)
            .execute(pool)
            .await
            .map_err(|e| StoreError::MigrationError(format!("{} failed: {}", name, e)))?;
    }

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Check if the schema has been initialized.
///
/// Returns true if the `export_history` table exists.
pub async fn is_schema_initialized(pool: &PgPool) -> StoreResult<bool> {
    let result: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = 'export_history'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(result.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_migration_embedded() {
        assert!(READING_MIGRATION.contains("CREATE TABLE IF NOT EXISTS user_sessions"));
        assert!(READING_MIGRATION.contains("CREATE TABLE IF NOT EXISTS documents"));
        assert!(READING_MIGRATION.contains("CREATE TABLE IF NOT EXISTS user_vocabulary"));
        assert!(READING_MIGRATION.contains("CREATE TABLE IF NOT EXISTS daily_learning_stats"));
    }

    #[test]
    fn test_tags_migration_uses_single_table() {
        assert!(TAGS_MIGRATION.contains("CREATE TABLE IF NOT EXISTS tags"));
        assert!(TAGS_MIGRATION.contains("UNIQUE (kind, name)"));
        assert!(TAGS_MIGRATION.contains("PRIMARY KEY (tag_id, entity_id)"));
    }

    #[test]
    fn test_exports_migration_has_typed_columns() {
        assert!(EXPORTS_MIGRATION.contains("export_id TEXT PRIMARY KEY"));
        assert!(EXPORTS_MIGRATION.contains("file_size BIGINT"));
        assert!(EXPORTS_MIGRATION.contains("CREATE TABLE IF NOT EXISTS export_templates"));
    }
}
