//! Audit event identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an audit event, assigned when the event is recorded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditEventId(Uuid);

impl AuditEventId {
    /// Create a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from string (with or without the `aud_` prefix).
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let s = s.strip_prefix("aud_").unwrap_or(s);
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| IdParseError::InvalidFormat(s.to_string()))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AuditEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuditEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aud_{}", self.0)
    }
}

impl fmt::Debug for AuditEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuditEventId({})", self)
    }
}

impl std::str::FromStr for AuditEventId {
    type Err = IdParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error parsing an ID.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdParseError {
    /// The ID format is invalid.
    #[error("invalid audit event ID: {0}")]
    InvalidFormat(String),
}
