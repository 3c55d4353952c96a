// src/migration/types.rs

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    ExecutionFailed(String),

    #[error("Migration checksum mismatch for {0}")]
    ChecksumMismatch(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A forward-only schema change. The integrity tables are never rolled back.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version (timestamp-based)
    pub version: i64,
    /// Migration name
    pub name: String,
    /// SQL to apply migration
    pub up_sql: String,
    /// SHA256 checksum of up_sql
    pub checksum: String,
}

impl Migration {
    pub fn new(version: i64, name: impl Into<String>, up_sql: impl Into<String>) -> Self {
        let up = up_sql.into();
        let checksum = Self::compute_checksum(&up);
        Self {
            version,
            name: name.into(),
            up_sql: up,
            checksum,
        }
    }

    pub fn compute_checksum(sql: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(sql.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn verify_checksum(&self) -> bool {
        Self::compute_checksum(&self.up_sql) == self.checksum
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub checksum: String,
    pub applied_at: DateTime<Utc>,
    pub execution_time_ms: i64,
}
