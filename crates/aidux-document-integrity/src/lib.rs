//! Tamper evidence for exported clinical documents.
//!
//! A document's exact bytes are hashed with SHA-256 ([`DocumentHasher`]) and
//! the hash is recorded against the clinical resource it was exported from.
//! Verification recomputes the hash and looks for a stored signature with the
//! same resource and hash; any change to the bytes breaks the match.
//!
//! Signatures are kept behind the [`SignatureStore`] trait:
//!
//! - [`MemorySignatureStore`] for tests and prototyping
//! - [`SqliteSignatureStore`] for durable deployments
//!
//! [`ExportWorkflow`] ties signing to document generation and keeps exports
//! flowing when the store is down.

mod export;
mod hasher;
mod memory;
mod service;
mod signature;
mod sqlite;
mod store;

pub use export::{DocumentGenerator, ExportWorkflow, ExportedDocument, SignatureStatus};
pub use hasher::{ContentHash, DocumentHasher, HashParseError, HASH_HEX_LEN};
pub use memory::MemorySignatureStore;
pub use service::DocumentIntegrityService;
pub use signature::{
    InsertOutcome, SignReceipt, SignatureRecord, VerificationFailure, VerificationResult,
};
pub use sqlite::SqliteSignatureStore;
pub use store::SignatureStore;
