//! Error types for the integrity subsystem.

use thiserror::Error;

/// Failures reported by a storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached (pool closed, timed out, I/O failure).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend was reachable but the statement failed.
    #[error("storage query failed: {0}")]
    Query(String),

    /// A stored row could not be decoded.
    #[error("corrupt stored row: {0}")]
    Corrupt(String),
}

impl StorageError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Whether the failure is transient, i.e. the store could not be reached at all.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result type alias for store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// The main error type for integrity and audit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input or filter.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend unreachable or query failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No matching record exists.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Signing failed while the document itself was produced.
    #[error("Integrity degraded for {resource_id}: {reason}")]
    IntegrityDegraded { resource_id: String, reason: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a new validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a degraded-integrity error.
    pub fn degraded(resource_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IntegrityDegraded {
            resource_id: resource_id.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller may retry the same operation later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::IntegrityDegraded { .. } => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias using the subsystem's Error.
pub type Result<T> = std::result::Result<T, Error>;
