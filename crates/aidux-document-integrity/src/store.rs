//! Signature store abstraction.

use crate::hasher::ContentHash;
use crate::signature::{InsertOutcome, SignatureRecord};
use aidux_common_core::StorageResult;
use async_trait::async_trait;

/// Persistence for document signatures.
///
/// At most one record exists per `(resource_id, hash)`. Records are never
/// updated or deleted.
#[async_trait]
pub trait SignatureStore: Send + Sync {
    /// Store `record` unless one already exists for its resource and hash.
    ///
    /// Must be atomic: of any number of concurrent calls for the same pair,
    /// exactly one observes [`InsertOutcome::Inserted`].
    async fn insert_if_absent(&self, record: &SignatureRecord) -> StorageResult<InsertOutcome>;

    /// The signature for this exact resource and content, if any.
    async fn find(
        &self,
        resource_id: &str,
        hash: &ContentHash,
    ) -> StorageResult<Option<SignatureRecord>>;

    /// All signatures of one resource, most recent first.
    async fn list_for(&self, resource_id: &str) -> StorageResult<Vec<SignatureRecord>>;
}
