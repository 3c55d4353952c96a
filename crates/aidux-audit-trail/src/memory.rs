//! In-memory audit trail store.

use crate::store::AuditTrailStore;
use aidux_audit_types::{AuditEvent, AuditFilter};
use aidux_common_core::{StorageError, StorageResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Process-local audit store.
///
/// Events are kept in insertion order. [`MemoryAuditStore::set_available`]
/// simulates a backend outage so callers' degraded paths can be exercised.
pub struct MemoryAuditStore {
    events: RwLock<Vec<AuditEvent>>,
    available: AtomicBool,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle simulated reachability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::unavailable("in-memory audit store is offline"))
        }
    }
}

impl Default for MemoryAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditTrailStore for MemoryAuditStore {
    async fn insert(&self, event: &AuditEvent) -> StorageResult<()> {
        self.check_available()?;
        self.events.write().push(event.clone());
        debug!(id = %event.id, "Audit event appended in memory");
        Ok(())
    }

    async fn select(&self, filter: &AuditFilter) -> StorageResult<Vec<AuditEvent>> {
        self.check_available()?;
        let events = self.events.read();

        // Index doubles as insertion sequence for the tiebreak.
        let mut matching: Vec<(usize, &AuditEvent)> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| filter.matches(e))
            .collect();
        matching.sort_by(|(ia, a), (ib, b)| b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia)));

        Ok(matching
            .into_iter()
            .skip(filter.offset.unwrap_or(0))
            .take(filter.limit.unwrap_or(usize::MAX))
            .map(|(_, e)| e.clone())
            .collect())
    }
}
