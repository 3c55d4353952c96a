//! Wiring configuration, storage and services together.

use crate::error::{config_error, migration_error, pool_error};
use aidux_audit_trail::{AuditTrailService, MemoryAuditStore, SqliteAuditStore};
use aidux_common_config::{ConfigLoader, DatabaseConfig, Environment, IntegrityConfig};
use aidux_common_core::{Error, Result};
use aidux_database::{migrate, DatabasePool, PoolConfig};
use aidux_document_integrity::{
    DocumentGenerator, DocumentHasher, DocumentIntegrityService, ExportWorkflow,
    MemorySignatureStore, SqliteSignatureStore,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Translate the storage section of the configuration into pool settings.
pub fn pool_config(database: &DatabaseConfig) -> Result<PoolConfig> {
    let base = if database.path == ":memory:" {
        PoolConfig::in_memory()
    } else {
        PoolConfig::default()
    };

    PoolConfig::builder()
        .database_path(database.path.clone())
        .max_connections(database.max_connections)
        .min_connections(base.min_connections.min(database.max_connections))
        .acquire_timeout(Duration::from_millis(database.acquire_timeout_ms))
        .busy_timeout(Duration::from_millis(database.busy_timeout_ms))
        .wal_mode(database.wal_mode && !base.is_in_memory())
        .build()
        .map_err(pool_error)
}

/// The running integrity subsystem: one audit trail and one signature
/// service sharing a storage backend.
#[derive(Clone)]
pub struct IntegrityServices {
    config: IntegrityConfig,
    pool: Option<DatabasePool>,
    audit: AuditTrailService,
    documents: DocumentIntegrityService,
}

impl IntegrityServices {
    /// Open the SQLite database named in `config`, migrate it and build the
    /// services over it.
    #[instrument(skip(config), fields(path = %config.database.path))]
    pub async fn open(config: IntegrityConfig) -> Result<Self> {
        DocumentHasher::self_test()?;

        let pool = DatabasePool::new(pool_config(&config.database)?)
            .await
            .map_err(pool_error)?;
        let applied = migrate(&pool).await.map_err(migration_error)?;

        let audit = AuditTrailService::with_config(
            Arc::new(SqliteAuditStore::new(&pool)),
            config.audit.clone(),
        );
        let documents = DocumentIntegrityService::new(Arc::new(SqliteSignatureStore::new(&pool)));

        info!(migrations = applied.len(), "Integrity services ready");
        Ok(Self {
            config,
            pool: Some(pool),
            audit,
            documents,
        })
    }

    /// Load `.aidux/config.yaml` under `project_dir`, apply environment
    /// overrides, and open.
    pub async fn from_project_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        Environment::init().map_err(|e| Error::config(e.to_string()))?;
        let config = ConfigLoader::new(project_dir)
            .load_with_env()
            .map_err(config_error)?;
        Self::open(config).await
    }

    /// Services over process-local stores. Nothing survives a restart.
    pub fn in_memory(config: IntegrityConfig) -> Result<Self> {
        DocumentHasher::self_test()?;

        let audit =
            AuditTrailService::with_config(Arc::new(MemoryAuditStore::new()), config.audit.clone());
        let documents = DocumentIntegrityService::new(Arc::new(MemorySignatureStore::new()));

        Ok(Self {
            config,
            pool: None,
            audit,
            documents,
        })
    }

    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    pub fn audit(&self) -> &AuditTrailService {
        &self.audit
    }

    pub fn documents(&self) -> &DocumentIntegrityService {
        &self.documents
    }

    /// An export workflow over this subsystem's signature service.
    pub fn export_workflow(&self, generator: Arc<dyn DocumentGenerator>) -> ExportWorkflow {
        ExportWorkflow::with_config(generator, self.documents.clone(), self.config.signing.clone())
    }

    /// Check that the storage backend answers.
    pub async fn health_check(&self) -> Result<()> {
        match &self.pool {
            Some(pool) => pool.health_check().await.map_err(pool_error),
            None => Ok(()),
        }
    }

    /// Close the database pool. Later storage calls fail as unavailable.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("Integrity services closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_from_defaults() {
        let pool = pool_config(&DatabaseConfig::default()).unwrap();
        assert_eq!(pool.database_path, "aidux.db");
        assert_eq!(pool.max_connections, 10);
        assert_eq!(pool.busy_timeout, Duration::from_secs(5));
        assert!(pool.wal_mode);
    }

    #[test]
    fn test_pool_config_in_memory() {
        let pool = pool_config(&DatabaseConfig::in_memory()).unwrap();
        assert!(pool.is_in_memory());
        assert_eq!(pool.max_connections, 1);
        assert!(!pool.wal_mode);
    }

    #[test]
    fn test_in_memory_database_needs_single_connection() {
        let database = DatabaseConfig {
            max_connections: 4,
            ..DatabaseConfig::in_memory()
        };
        assert!(matches!(pool_config(&database), Err(Error::Config(_))));
    }
}
