//! Clinical record integrity and audit subsystem.
//!
//! Two services make up the subsystem:
//!
//! - the audit trail, an append-only log of every change made to a clinical
//!   record, whether typed by a clinician or proposed by the copilot;
//! - document integrity, which signs the exact bytes of an exported document
//!   and later proves they are unchanged.
//!
//! [`IntegrityServices`] builds both from an [`IntegrityConfig`] over a
//! shared SQLite database, or over in-memory stores for tests.
//!
//! ```no_run
//! # async fn run() -> aidux_common_core::Result<()> {
//! use aidux_integrity::{AuditEvent, ClinicalAction, IntegrityServices};
//!
//! let services = IntegrityServices::from_project_dir(".").await?;
//! services
//!     .audit()
//!     .record(
//!         AuditEvent::builder("visit", "visit-1", ClinicalAction::FieldUpdated)
//!             .field("motivo")
//!             .new_value("Dolor lumbar")
//!             .actor("doctor@aiduxcare.com"),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod bootstrap;
mod error;

pub use bootstrap::{pool_config, IntegrityServices};

pub use aidux_audit_trail::{
    AuditEvent, AuditEventId, AuditFilter, AuditStats, AuditTrailService, AuditTrailStore,
    ChangeSource, ClinicalAction, NewAuditEvent,
};
pub use aidux_common_config::{AuditConfig, DatabaseConfig, IntegrityConfig, SigningConfig};
pub use aidux_common_core::{Error, Result, StorageError, Timestamp};
pub use aidux_document_integrity::{
    ContentHash, DocumentGenerator, DocumentHasher, DocumentIntegrityService, ExportWorkflow,
    ExportedDocument, SignReceipt, SignatureRecord, SignatureStatus, SignatureStore,
    VerificationFailure, VerificationResult,
};

/// Install the global tracing subscriber from `AIDUX_LOG_*` variables.
pub fn init_logging() -> Result<()> {
    aidux_common_log::init(aidux_common_log::LogConfig::from_env()).map_err(error::log_error)
}
