//! Signing and verifying exported documents.

use crate::hasher::{ContentHash, DocumentHasher};
use crate::signature::{InsertOutcome, SignReceipt, SignatureRecord, VerificationResult};
use crate::store::SignatureStore;
use aidux_common_core::{Error, Result, Timestamp};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Signs document content and later proves it unchanged.
///
/// Signing is idempotent per `(resource_id, content)`: a repeat succeeds with
/// `already_signed` set and keeps the original signer and time.
#[derive(Clone)]
pub struct DocumentIntegrityService {
    store: Arc<dyn SignatureStore>,
}

impl DocumentIntegrityService {
    pub fn new(store: Arc<dyn SignatureStore>) -> Self {
        Self { store }
    }

    /// Hash `bytes` and record a signature for them.
    ///
    /// Fails with `Validation` for a blank resource or signer, and with
    /// `Storage` when the store cannot be written; nothing is recorded then.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn sign(&self, resource_id: &str, signer_id: &str, bytes: &[u8]) -> Result<SignReceipt> {
        if resource_id.trim().is_empty() {
            return Err(Error::validation("resource_id must not be empty"));
        }
        if signer_id.trim().is_empty() {
            return Err(Error::validation("signer_id must not be empty"));
        }

        let hash = DocumentHasher::hash(bytes);
        let record = SignatureRecord::new(resource_id, hash.clone(), signer_id, Timestamp::now());

        let outcome = self.store.insert_if_absent(&record).await.map_err(|e| {
            warn!(error = %e, hash = %hash, "Failed to store document signature");
            Error::from(e)
        })?;

        let already_signed = matches!(outcome, InsertOutcome::AlreadyExists(_));
        if already_signed {
            debug!(hash = %hash, "Document already signed");
        } else {
            info!(hash = %hash, signer_id, "Document signed");
        }

        Ok(SignReceipt {
            hash,
            already_signed,
            signature: outcome.into_record(),
        })
    }

    /// Check `bytes` against the signatures stored for `resource_id`.
    ///
    /// Never fails outright: an unreachable store yields a result whose
    /// error is transient, distinct from "no matching signature".
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn verify(&self, resource_id: &str, bytes: &[u8]) -> VerificationResult {
        self.verify_hash(resource_id, DocumentHasher::hash(bytes)).await
    }

    /// Verify a precomputed content hash.
    #[instrument(skip(self))]
    pub async fn verify_hash(&self, resource_id: &str, hash: ContentHash) -> VerificationResult {
        match self.store.find(resource_id, &hash).await {
            Ok(Some(signature)) => {
                debug!(signer_id = %signature.signer_id, "Signature matched");
                VerificationResult::matched(hash, signature)
            }
            Ok(None) => {
                info!(hash = %hash, "No matching signature");
                VerificationResult::no_match(hash)
            }
            Err(e) => {
                warn!(error = %e, "Signature store unavailable during verification");
                VerificationResult::unavailable(hash, e)
            }
        }
    }

    /// Every signature recorded for `resource_id`, most recent first.
    pub async fn signatures_for(&self, resource_id: &str) -> Result<Vec<SignatureRecord>> {
        if resource_id.trim().is_empty() {
            return Err(Error::validation("resource_id must not be empty"));
        }
        Ok(self.store.list_for(resource_id).await?)
    }
}
