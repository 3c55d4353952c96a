//! In-memory signature store.

use crate::hasher::ContentHash;
use crate::signature::{InsertOutcome, SignatureRecord};
use crate::store::SignatureStore;
use aidux_common_core::{StorageError, StorageResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Insertion sequence plus record.
type Slot = (u64, SignatureRecord);

#[derive(Default)]
struct Inner {
    records: HashMap<(String, ContentHash), Slot>,
    next_seq: u64,
}

/// Process-local signature store.
///
/// Uniqueness is enforced under a single write lock, so concurrent
/// `insert_if_absent` calls for the same pair see exactly one winner.
pub struct MemorySignatureStore {
    inner: RwLock<Inner>,
    available: AtomicBool,
}

impl MemorySignatureStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle simulated reachability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::unavailable("in-memory signature store is offline"))
        }
    }
}

impl Default for MemorySignatureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignatureStore for MemorySignatureStore {
    async fn insert_if_absent(&self, record: &SignatureRecord) -> StorageResult<InsertOutcome> {
        self.check_available()?;

        let mut inner = self.inner.write();
        let seq = inner.next_seq;
        let key = (record.resource_id.clone(), record.hash.clone());

        let outcome = match inner.records.entry(key) {
            Entry::Occupied(existing) => InsertOutcome::AlreadyExists(existing.get().1.clone()),
            Entry::Vacant(slot) => {
                slot.insert((seq, record.clone()));
                InsertOutcome::Inserted(record.clone())
            }
        };
        if matches!(outcome, InsertOutcome::Inserted(_)) {
            inner.next_seq += 1;
        }
        Ok(outcome)
    }

    async fn find(
        &self,
        resource_id: &str,
        hash: &ContentHash,
    ) -> StorageResult<Option<SignatureRecord>> {
        self.check_available()?;

        let inner = self.inner.read();
        Ok(inner
            .records
            .get(&(resource_id.to_string(), hash.clone()))
            .map(|(_, record)| record.clone()))
    }

    async fn list_for(&self, resource_id: &str) -> StorageResult<Vec<SignatureRecord>> {
        self.check_available()?;

        let inner = self.inner.read();
        let mut matching: Vec<&Slot> = inner
            .records
            .values()
            .filter(|(_, r)| r.resource_id == resource_id)
            .collect();
        matching.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));

        Ok(matching.into_iter().map(|(_, r)| r.clone()).collect())
    }
}
