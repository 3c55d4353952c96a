//! Audit trail storage trait.

use aidux_audit_types::{AuditEvent, AuditFilter};
use aidux_common_core::StorageResult;
use async_trait::async_trait;

/// Append-only storage for audit events.
///
/// Stored rows are never updated or deleted.
#[async_trait]
pub trait AuditTrailStore: Send + Sync {
    /// Durably append one event.
    async fn insert(&self, event: &AuditEvent) -> StorageResult<()>;

    /// Events matching `filter`, ordered by timestamp descending with later
    /// insertions first among equal timestamps, then paged by the filter's
    /// offset and limit (no limit means all matches).
    async fn select(&self, filter: &AuditFilter) -> StorageResult<Vec<AuditEvent>>;
}
