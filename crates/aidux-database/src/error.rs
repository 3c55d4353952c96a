use aidux_common_core::StorageError;

/// Classify a driver error: connectivity problems are transient, anything
/// else is a failed statement.
pub fn storage_error(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
            StorageError::Unavailable(err.to_string())
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StorageError::Unavailable(err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StorageError::Corrupt(err.to_string())
        }
        sqlx::Error::Database(ref db) if is_busy(db.message()) => {
            StorageError::Unavailable(err.to_string())
        }
        other => StorageError::Query(other.to_string()),
    }
}

fn is_busy(message: &str) -> bool {
    message.contains("database is locked") || message.contains("database is busy")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_transient() {
        assert!(storage_error(sqlx::Error::PoolClosed).is_transient());
        assert!(storage_error(sqlx::Error::PoolTimedOut).is_transient());
    }

    #[test]
    fn test_row_not_found_is_query_error() {
        assert!(matches!(
            storage_error(sqlx::Error::RowNotFound),
            StorageError::Query(_)
        ));
    }
}
