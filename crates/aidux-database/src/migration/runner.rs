// src/migration/runner.rs

use super::types::*;
use chrono::Utc;
use sqlx::{Executor, Row, SqlitePool};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub struct MigrationRunner {
    pool: SqlitePool,
    migrations: BTreeMap<i64, Migration>,
}

impl MigrationRunner {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            migrations: BTreeMap::new(),
        }
    }

    pub fn add_migration(&mut self, migration: Migration) {
        self.migrations.insert(migration.version, migration);
    }

    pub fn add_migrations(&mut self, migrations: Vec<Migration>) {
        for migration in migrations {
            self.add_migration(migration);
        }
    }

    /// Initialize the migration tracking table
    pub async fn init(&self) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _aidux_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                checksum TEXT NOT NULL,
                applied_at DATETIME NOT NULL,
                execution_time_ms INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get current database version (highest applied migration)
    pub async fn current_version(&self) -> Result<Option<i64>, MigrationError> {
        self.init().await?;

        let row = sqlx::query("SELECT MAX(version) as version FROM _aidux_migrations")
            .fetch_one(&self.pool)
            .await?;

        let version: Option<i64> = row.try_get("version")?;
        Ok(version)
    }

    /// Get list of applied migrations
    pub async fn get_applied(&self) -> Result<Vec<AppliedMigration>, MigrationError> {
        self.init().await?;

        let applied = sqlx::query_as::<_, AppliedMigration>(
            "SELECT version, name, checksum, applied_at, execution_time_ms
             FROM _aidux_migrations
             ORDER BY version",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(applied)
    }

    /// Get list of pending migrations
    pub async fn pending(&self) -> Result<Vec<Migration>, MigrationError> {
        let current = self.current_version().await?.unwrap_or(0);

        Ok(self
            .migrations
            .range(current + 1..)
            .map(|(_, m)| m.clone())
            .collect())
    }

    /// Run all pending migrations, after checking that applied ones were not edited.
    pub async fn run(&self) -> Result<Vec<MigrationResult>, MigrationError> {
        if let Some(mismatch) = self.verify().await?.into_iter().next() {
            return Err(MigrationError::ChecksumMismatch(mismatch));
        }

        let pending = self.pending().await?;
        if pending.is_empty() {
            debug!("Schema is up to date");
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(pending.len());
        for migration in pending {
            results.push(self.apply(migration).await?);
        }
        Ok(results)
    }

    /// Verify migration checksums
    pub async fn verify(&self) -> Result<Vec<String>, MigrationError> {
        let applied = self.get_applied().await?;
        let mut mismatches = Vec::new();

        for applied_migration in applied {
            if let Some(known) = self.migrations.get(&applied_migration.version) {
                if applied_migration.checksum != known.checksum {
                    mismatches.push(format!(
                        "Migration {} checksum mismatch: expected {}, found {}",
                        applied_migration.version, known.checksum, applied_migration.checksum
                    ));
                }
            } else {
                mismatches.push(format!(
                    "Migration {} is applied but no longer known",
                    applied_migration.version
                ));
            }
        }

        Ok(mismatches)
    }

    async fn apply(&self, migration: Migration) -> Result<MigrationResult, MigrationError> {
        let start = std::time::Instant::now();
        info!("Applying migration: {} - {}", migration.version, migration.name);

        let mut tx = self.pool.begin().await?;

        (&mut *tx)
            .execute(migration.up_sql.as_str())
            .await
            .map_err(|e| {
                MigrationError::ExecutionFailed(format!(
                    "Failed to apply migration {}: {}",
                    migration.version, e
                ))
            })?;

        let execution_time_ms = start.elapsed().as_millis() as i64;
        sqlx::query(
            "INSERT INTO _aidux_migrations
             (version, name, checksum, applied_at, execution_time_ms)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(migration.version)
        .bind(&migration.name)
        .bind(&migration.checksum)
        .bind(Utc::now())
        .bind(execution_time_ms)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(MigrationResult {
            version: migration.version,
            name: migration.name,
            execution_time_ms,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub version: i64,
    pub name: String,
    pub execution_time_ms: i64,
}
