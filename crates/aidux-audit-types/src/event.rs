//! Core audit event type.

use crate::{AuditEventId, ChangeSource, ClinicalAction};
use aidux_common_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Field name used when a change is not tied to a single attribute.
pub const GENERAL_FIELD: &str = "general";

/// A stored, immutable audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Assigned when the event is recorded.
    pub id: AuditEventId,
    pub resource_type: String,
    pub resource_id: String,
    /// Assigned when the event is recorded; never supplied by the caller.
    pub timestamp: Timestamp,
    pub action: ClinicalAction,
    /// Attribute name, or [`GENERAL_FIELD`].
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub actor_id: String,
    pub source: ChangeSource,
}

impl AuditEvent {
    /// Start describing a change to record.
    pub fn builder(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        action: ClinicalAction,
    ) -> NewAuditEvent {
        NewAuditEvent::new(resource_type, resource_id, action)
    }

    /// Whether the recorded values are identical (a no-op change).
    pub fn is_noop(&self) -> bool {
        self.old_value == self.new_value
    }
}

/// A change as described by the caller, before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEvent {
    pub resource_type: String,
    pub resource_id: String,
    pub action: ClinicalAction,
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub actor_id: Option<String>,
    pub source: ChangeSource,
}

impl NewAuditEvent {
    /// Create a new description.
    pub fn new(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        action: ClinicalAction,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            action,
            field: None,
            old_value: None,
            new_value: None,
            actor_id: None,
            source: ChangeSource::User,
        }
    }

    /// Set the changed attribute.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set the previous value.
    pub fn old_value(mut self, value: impl Into<String>) -> Self {
        self.old_value = Some(value.into());
        self
    }

    /// Set the new value.
    pub fn new_value(mut self, value: impl Into<String>) -> Self {
        self.new_value = Some(value.into());
        self
    }

    /// Set the acting user.
    pub fn actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Set the origin of the change.
    pub fn source(mut self, source: ChangeSource) -> Self {
        self.source = source;
        self
    }

    /// Stamp the description into a stored event.
    ///
    /// A missing or blank actor becomes `default_actor`; a missing or blank
    /// field becomes [`GENERAL_FIELD`].
    pub fn into_event(
        self,
        id: AuditEventId,
        timestamp: Timestamp,
        default_actor: &str,
    ) -> AuditEvent {
        let actor_id = self
            .actor_id
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| default_actor.to_string());
        let field = self
            .field
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| GENERAL_FIELD.to_string());

        AuditEvent {
            id,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            timestamp,
            action: self.action,
            field,
            old_value: self.old_value,
            new_value: self.new_value,
            actor_id,
            source: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let event = AuditEvent::builder("visit", "visit-1", ClinicalAction::FormSubmitted)
            .into_event(AuditEventId::new(), Timestamp::now(), "unknown");

        assert_eq!(event.field, GENERAL_FIELD);
        assert_eq!(event.actor_id, "unknown");
        assert_eq!(event.source, ChangeSource::User);
        assert!(event.old_value.is_none());
        assert!(event.is_noop());
    }

    #[test]
    fn test_blank_actor_uses_sentinel() {
        let event = AuditEvent::builder("visit", "visit-1", ClinicalAction::ManualEdit)
            .actor("   ")
            .field("")
            .into_event(AuditEventId::new(), Timestamp::now(), "system");

        assert_eq!(event.actor_id, "system");
        assert_eq!(event.field, GENERAL_FIELD);
    }

    #[test]
    fn test_json_shape() {
        let event = AuditEvent::builder("visit", "visit-1", ClinicalAction::FieldUpdated)
            .field("motivo")
            .old_value("Dolor")
            .new_value("Dolor lumbar")
            .actor("doctor@aiduxcare.com")
            .into_event(AuditEventId::new(), Timestamp::now(), "unknown");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["resourceId"], "visit-1");
        assert_eq!(json["action"], "field_updated");
        assert_eq!(json["oldValue"], "Dolor");
        assert_eq!(json["source"], "user");

        let back: AuditEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
