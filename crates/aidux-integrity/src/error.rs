//! Mapping setup failures into the subsystem's error taxonomy.

use aidux_common_config::ConfigError;
use aidux_common_core::{Error, StorageError};
use aidux_common_log::LogError;
use aidux_database::{storage_error, MigrationError, PoolError};

pub(crate) fn pool_error(err: PoolError) -> Error {
    match err {
        PoolError::Creation(e) => Error::Storage(storage_error(e)),
        PoolError::HealthCheck(msg) => Error::Storage(StorageError::unavailable(msg)),
        PoolError::InvalidConfig(msg) => Error::config(msg),
    }
}

pub(crate) fn migration_error(err: MigrationError) -> Error {
    match err {
        MigrationError::Database(e) => Error::Storage(storage_error(e)),
        MigrationError::ChecksumMismatch(name) => Error::Storage(StorageError::Corrupt(format!(
            "applied migration {name} no longer matches its definition"
        ))),
        MigrationError::ExecutionFailed(msg) => Error::Storage(StorageError::query(msg)),
    }
}

pub(crate) fn config_error(err: ConfigError) -> Error {
    match err {
        ConfigError::ReadError { source } => Error::Io(source),
        other => Error::config(other.to_string()),
    }
}

pub(crate) fn log_error(err: LogError) -> Error {
    Error::config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pool_config_is_config_error() {
        let err = pool_error(PoolError::InvalidConfig("max_connections".into()));
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_failed_health_check_is_transient() {
        let err = pool_error(PoolError::HealthCheck("connection refused".into()));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_checksum_mismatch_is_corrupt() {
        let err = migration_error(MigrationError::ChecksumMismatch("create_audit_events".into()));
        assert!(matches!(err, Error::Storage(StorageError::Corrupt(_))));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_validation_config_error() {
        let err = config_error(ConfigError::ValidationError {
            message: "database.path must not be empty".into(),
        });
        assert!(matches!(err, Error::Config(msg) if msg.contains("database.path")));
    }
}
