//! Append-only audit trail for clinical record changes.
//!
//! Every field-level change to a clinical record, whether typed by a
//! clinician or proposed by the copilot, is recorded once through
//! [`AuditTrailService::record`] and never modified afterwards. Storage sits
//! behind the narrow [`AuditTrailStore`] trait:
//!
//! - [`MemoryAuditStore`] for tests and prototyping
//! - [`SqliteAuditStore`] for durable deployments

mod memory;
mod service;
mod sqlite;
mod store;

pub use memory::MemoryAuditStore;
pub use service::AuditTrailService;
pub use sqlite::SqliteAuditStore;
pub use store::AuditTrailStore;

pub use aidux_common_config::{AuditConfig, DEFAULT_ACTOR};

pub use aidux_audit_types::{
    AuditEvent, AuditEventId, AuditFilter, AuditStats, ChangeSource, ClinicalAction,
    NewAuditEvent,
};
