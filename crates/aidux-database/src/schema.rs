//! Schema for the audit trail and signature tables.
//!
//! Both tables are append-only: triggers abort any `UPDATE` or `DELETE`, so
//! immutability holds even for writers that bypass the stores.

use crate::migration::{Migration, MigrationError, MigrationResult, MigrationRunner};
use crate::pool::DatabasePool;
use tracing::info;

const CREATE_AUDIT_EVENTS: &str = r#"
CREATE TABLE audit_events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    resource_type TEXT NOT NULL,
    resource_id TEXT NOT NULL,
    timestamp_us INTEGER NOT NULL,
    action TEXT NOT NULL,
    field TEXT NOT NULL,
    old_value TEXT,
    new_value TEXT,
    actor_id TEXT NOT NULL,
    source TEXT NOT NULL
);
CREATE INDEX idx_audit_events_resource ON audit_events (resource_id, timestamp_us DESC, seq DESC);
CREATE INDEX idx_audit_events_actor ON audit_events (actor_id, timestamp_us DESC, seq DESC);
CREATE INDEX idx_audit_events_time ON audit_events (timestamp_us DESC, seq DESC);
CREATE TRIGGER audit_events_no_update BEFORE UPDATE ON audit_events
BEGIN
    SELECT RAISE(ABORT, 'audit_events is append-only');
END;
CREATE TRIGGER audit_events_no_delete BEFORE DELETE ON audit_events
BEGIN
    SELECT RAISE(ABORT, 'audit_events is append-only');
END;
"#;

const CREATE_DOCUMENT_SIGNATURES: &str = r#"
CREATE TABLE document_signatures (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id TEXT NOT NULL,
    hash TEXT NOT NULL CHECK (length(hash) = 64),
    signer_id TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    UNIQUE (resource_id, hash)
);
CREATE TRIGGER document_signatures_no_update BEFORE UPDATE ON document_signatures
BEGIN
    SELECT RAISE(ABORT, 'document_signatures is append-only');
END;
CREATE TRIGGER document_signatures_no_delete BEFORE DELETE ON document_signatures
BEGIN
    SELECT RAISE(ABORT, 'document_signatures is append-only');
END;
"#;

/// Every schema migration, in version order.
pub fn integrity_migrations() -> Vec<Migration> {
    vec![
        Migration::new(20250301000000, "create_audit_events", CREATE_AUDIT_EVENTS),
        Migration::new(
            20250301000100,
            "create_document_signatures",
            CREATE_DOCUMENT_SIGNATURES,
        ),
    ]
}

/// Bring the database schema up to date.
pub async fn migrate(pool: &DatabasePool) -> Result<Vec<MigrationResult>, MigrationError> {
    let mut runner = MigrationRunner::new(pool.pool().clone());
    runner.add_migrations(integrity_migrations());

    let applied = runner.run().await?;
    if !applied.is_empty() {
        info!(count = applied.len(), "Integrity schema migrated");
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolConfig;

    async fn migrated_pool() -> DatabasePool {
        let pool = DatabasePool::new(PoolConfig::in_memory()).await.unwrap();
        migrate(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_migrate_twice() {
        let pool = DatabasePool::new(PoolConfig::in_memory()).await.unwrap();
        assert_eq!(migrate(&pool).await.unwrap().len(), 2);
        assert!(migrate(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_audit_rows_cannot_change() {
        let pool = migrated_pool().await;
        sqlx::query(
            "INSERT INTO audit_events
             (id, resource_type, resource_id, timestamp_us, action, field, actor_id, source)
             VALUES ('a', 'visit', 'visit-1', 1, 'field_updated', 'motivo', 'dr', 'user')",
        )
        .execute(pool.pool())
        .await
        .unwrap();

        let update = sqlx::query("UPDATE audit_events SET field = 'x'")
            .execute(pool.pool())
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM audit_events").execute(pool.pool()).await;
        assert!(delete.is_err());
    }

    #[tokio::test]
    async fn test_signature_pair_is_unique() {
        let pool = migrated_pool().await;
        let hash = "a".repeat(64);
        let insert = "INSERT INTO document_signatures (resource_id, hash, signer_id, created_at_us)
                      VALUES (?, ?, ?, 1)";

        sqlx::query(insert)
            .bind("visit-1")
            .bind(&hash)
            .bind("dr")
            .execute(pool.pool())
            .await
            .unwrap();

        let duplicate = sqlx::query(insert)
            .bind("visit-1")
            .bind(&hash)
            .bind("other")
            .execute(pool.pool())
            .await;
        assert!(duplicate.is_err());

        sqlx::query(insert)
            .bind("visit-2")
            .bind(&hash)
            .bind("dr")
            .execute(pool.pool())
            .await
            .unwrap();
    }
}
