//! Clinical audit event types for AiDuxCare.

mod action;
mod event;
mod filter;
mod id;
mod source;
mod stats;

pub use action::ClinicalAction;
pub use event::{AuditEvent, NewAuditEvent, GENERAL_FIELD};
pub use filter::AuditFilter;
pub use id::{AuditEventId, IdParseError};
pub use source::ChangeSource;
pub use stats::AuditStats;
