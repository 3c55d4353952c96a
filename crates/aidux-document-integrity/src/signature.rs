//! Signature records and verification outcomes.

use crate::hasher::ContentHash;
use aidux_common_core::{Error, StorageError, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attestation that `signer_id` vouched for the document of `resource_id`
/// whose content hashed to `hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub resource_id: String,
    pub hash: ContentHash,
    pub signer_id: String,
    pub created_at: Timestamp,
}

impl SignatureRecord {
    pub fn new(
        resource_id: impl Into<String>,
        hash: ContentHash,
        signer_id: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            hash,
            signer_id: signer_id.into(),
            created_at,
        }
    }
}

/// What a conditional insert did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was stored.
    Inserted(SignatureRecord),
    /// A record for the same resource and hash already existed; it is returned
    /// unchanged.
    AlreadyExists(SignatureRecord),
}

impl InsertOutcome {
    pub fn record(&self) -> &SignatureRecord {
        match self {
            Self::Inserted(r) | Self::AlreadyExists(r) => r,
        }
    }

    pub fn into_record(self) -> SignatureRecord {
        match self {
            Self::Inserted(r) | Self::AlreadyExists(r) => r,
        }
    }
}

/// Successful signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignReceipt {
    pub hash: ContentHash,
    /// The same content was already signed for this resource. Not an error.
    pub already_signed: bool,
    /// The stored signature; on a repeat this is the original one.
    pub signature: SignatureRecord,
}

/// Why a verification did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// No signature exists for this resource and content.
    NoMatchingSignature,
    /// The signature store could not be queried. Retrying may succeed.
    StoreUnavailable(StorageError),
}

impl VerificationFailure {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingSignature => f.write_str("no matching signature"),
            Self::StoreUnavailable(e) => write!(f, "signature store unavailable: {e}"),
        }
    }
}

/// Outcome of checking a document against its stored signatures.
///
/// `valid` is true only when a stored signature matches both the resource id
/// and the exact content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub valid: bool,
    /// Hash of the bytes that were checked.
    pub hash: ContentHash,
    pub matched_signature: Option<SignatureRecord>,
    pub error: Option<VerificationFailure>,
}

impl VerificationResult {
    pub fn matched(hash: ContentHash, signature: SignatureRecord) -> Self {
        Self {
            valid: true,
            hash,
            matched_signature: Some(signature),
            error: None,
        }
    }

    pub fn no_match(hash: ContentHash) -> Self {
        Self::failed(hash, VerificationFailure::NoMatchingSignature)
    }

    pub fn unavailable(hash: ContentHash, error: StorageError) -> Self {
        Self::failed(hash, VerificationFailure::StoreUnavailable(error))
    }

    fn failed(hash: ContentHash, failure: VerificationFailure) -> Self {
        Self {
            valid: false,
            hash,
            matched_signature: None,
            error: Some(failure),
        }
    }

    /// The check could not be completed; the document may still be authentic.
    pub fn is_transient(&self) -> bool {
        self.error.as_ref().is_some_and(VerificationFailure::is_transient)
    }

    /// Convert into the error taxonomy: no match becomes `NotFound`, an
    /// unreachable store becomes `Storage`.
    pub fn into_result(self) -> Result<SignatureRecord, Error> {
        match (self.matched_signature, self.error) {
            (Some(signature), None) => Ok(signature),
            (_, Some(VerificationFailure::StoreUnavailable(e))) => Err(Error::Storage(e)),
            _ => Err(Error::not_found(format!(
                "no matching signature for hash {}",
                self.hash
            ))),
        }
    }
}
