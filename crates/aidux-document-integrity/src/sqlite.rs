//! SQLite-backed signature store.

use crate::hasher::ContentHash;
use crate::signature::{InsertOutcome, SignatureRecord};
use crate::store::SignatureStore;
use aidux_common_core::{StorageError, StorageResult, Timestamp};
use aidux_common_log::spans::storage_span;
use aidux_database::{storage_error, DatabasePool};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, Instrument};

const TABLE: &str = "document_signatures";

/// Durable signature store over the `document_signatures` table.
///
/// Uniqueness comes from the table's `UNIQUE (resource_id, hash)` constraint,
/// which holds across processes sharing the database file.
#[derive(Clone)]
pub struct SqliteSignatureStore {
    pool: SqlitePool,
}

impl SqliteSignatureStore {
    pub fn new(pool: &DatabasePool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct SignatureRow {
    resource_id: String,
    hash: String,
    signer_id: String,
    created_at_us: i64,
}

impl TryFrom<SignatureRow> for SignatureRecord {
    type Error = StorageError;

    fn try_from(row: SignatureRow) -> Result<Self, Self::Error> {
        let hash = ContentHash::parse(&row.hash)
            .map_err(|e| StorageError::Corrupt(format!("signature hash: {e}")))?;
        let created_at = Timestamp::from_micros(row.created_at_us).ok_or_else(|| {
            StorageError::Corrupt(format!("created_at out of range: {}", row.created_at_us))
        })?;

        Ok(SignatureRecord {
            resource_id: row.resource_id,
            hash,
            signer_id: row.signer_id,
            created_at,
        })
    }
}

#[async_trait]
impl SignatureStore for SqliteSignatureStore {
    async fn insert_if_absent(&self, record: &SignatureRecord) -> StorageResult<InsertOutcome> {
        let result = sqlx::query(
            "INSERT INTO document_signatures (resource_id, hash, signer_id, created_at_us)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (resource_id, hash) DO NOTHING",
        )
        .bind(&record.resource_id)
        .bind(record.hash.as_str())
        .bind(&record.signer_id)
        .bind(record.created_at.as_micros())
        .execute(&self.pool)
        .instrument(storage_span(TABLE, "insert"))
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 1 {
            debug!(resource_id = %record.resource_id, "Signature stored");
            return Ok(InsertOutcome::Inserted(record.clone()));
        }

        // Rows are never deleted, so the conflicting row is still there.
        match self.find(&record.resource_id, &record.hash).await? {
            Some(existing) => Ok(InsertOutcome::AlreadyExists(existing)),
            None => Err(StorageError::query(format!(
                "insert for {} ignored but no existing signature found",
                record.resource_id
            ))),
        }
    }

    async fn find(
        &self,
        resource_id: &str,
        hash: &ContentHash,
    ) -> StorageResult<Option<SignatureRecord>> {
        let row: Option<SignatureRow> = sqlx::query_as(
            "SELECT resource_id, hash, signer_id, created_at_us
             FROM document_signatures
             WHERE resource_id = ? AND hash = ?",
        )
        .bind(resource_id)
        .bind(hash.as_str())
        .fetch_optional(&self.pool)
        .instrument(storage_span(TABLE, "find"))
        .await
        .map_err(storage_error)?;

        row.map(SignatureRecord::try_from).transpose()
    }

    async fn list_for(&self, resource_id: &str) -> StorageResult<Vec<SignatureRecord>> {
        let rows: Vec<SignatureRow> = sqlx::query_as(
            "SELECT resource_id, hash, signer_id, created_at_us
             FROM document_signatures
             WHERE resource_id = ?
             ORDER BY created_at_us DESC, seq DESC",
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .instrument(storage_span(TABLE, "list"))
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(SignatureRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::DocumentHasher;
    use aidux_database::{migrate, PoolConfig};

    async fn store() -> (DatabasePool, SqliteSignatureStore) {
        let pool = DatabasePool::new(PoolConfig::in_memory()).await.unwrap();
        migrate(&pool).await.unwrap();
        let store = SqliteSignatureStore::new(&pool);
        (pool, store)
    }

    fn record(resource_id: &str, content: &[u8], micros: i64) -> SignatureRecord {
        SignatureRecord::new(
            resource_id,
            DocumentHasher::hash(content),
            "doctor@aiduxcare.com",
            Timestamp::from_micros(micros).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_insert_then_duplicate_returns_original() {
        let (_pool, store) = store().await;
        let first = record("visit-1", b"report", 100);
        assert_eq!(
            store.insert_if_absent(&first).await.unwrap(),
            InsertOutcome::Inserted(first.clone())
        );

        let mut repeat = record("visit-1", b"report", 200);
        repeat.signer_id = "nurse@aiduxcare.com".into();
        assert_eq!(
            store.insert_if_absent(&repeat).await.unwrap(),
            InsertOutcome::AlreadyExists(first)
        );
    }

    #[tokio::test]
    async fn test_find_requires_both_keys() {
        let (_pool, store) = store().await;
        let stored = record("visit-1", b"report", 100);
        store.insert_if_absent(&stored).await.unwrap();

        assert_eq!(
            store.find("visit-1", &stored.hash).await.unwrap(),
            Some(stored.clone())
        );
        assert_eq!(store.find("visit-2", &stored.hash).await.unwrap(), None);
        assert_eq!(
            store
                .find("visit-1", &DocumentHasher::hash(b"other"))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (_pool, store) = store().await;
        let a = record("visit-1", b"v1", 100);
        let b = record("visit-1", b"v2", 300);
        let c = record("visit-1", b"v3", 300);
        for r in [&a, &b, &c] {
            store.insert_if_absent(r).await.unwrap();
        }
        store.insert_if_absent(&record("visit-2", b"v1", 400)).await.unwrap();

        assert_eq!(store.list_for("visit-1").await.unwrap(), vec![c, b, a]);
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() {
        let (pool, store) = store().await;
        pool.close().await;

        let err = store
            .find("visit-1", &DocumentHasher::hash(b"report"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
