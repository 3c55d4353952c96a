//! Audit trail query filter.

use crate::{AuditEvent, ClinicalAction};
use aidux_common_core::{Error, Result, Timestamp};
use serde::{Deserialize, Serialize};

/// Predicate and page over the audit trail.
///
/// Every set criterion must match. `since` and `until` are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditFilter {
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub actor_id: Option<String>,
    pub action: Option<ClinicalAction>,
    pub since: Option<Timestamp>,
    pub until: Option<Timestamp>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl AuditFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events for one resource (any type).
    pub fn for_resource(resource_id: impl Into<String>) -> Self {
        Self::new().resource_id(resource_id)
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn action(mut self, action: ClinicalAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn since(mut self, since: Timestamp) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: Timestamp) -> Self {
        self.until = Some(until);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Reject malformed filters.
    pub fn validate(&self, max_limit: usize) -> Result<()> {
        for (name, value) in [
            ("resource_type", &self.resource_type),
            ("resource_id", &self.resource_id),
            ("actor_id", &self.actor_id),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(Error::validation(format!("{name} filter must not be empty")));
            }
        }

        match self.limit {
            Some(0) => return Err(Error::validation("limit must be at least 1")),
            Some(limit) if limit > max_limit => {
                return Err(Error::validation(format!(
                    "limit {limit} exceeds maximum of {max_limit}"
                )))
            }
            _ => {}
        }

        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(Error::validation("since must not be after until"));
            }
        }

        Ok(())
    }

    /// Whether an event satisfies the predicate part of the filter.
    pub fn matches(&self, event: &AuditEvent) -> bool {
        self.resource_type
            .as_ref()
            .map_or(true, |t| *t == event.resource_type)
            && self
                .resource_id
                .as_ref()
                .map_or(true, |id| *id == event.resource_id)
            && self
                .actor_id
                .as_ref()
                .map_or(true, |a| *a == event.actor_id)
            && self
                .action
                .as_ref()
                .map_or(true, |a| a.as_str() == event.action.as_str())
            && self.since.map_or(true, |s| event.timestamp >= s)
            && self.until.map_or(true, |u| event.timestamp <= u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuditEventId, ChangeSource};

    fn event(resource_id: &str, actor: &str, micros: i64) -> AuditEvent {
        AuditEvent::builder("visit", resource_id, ClinicalAction::FieldUpdated)
            .actor(actor)
            .source(ChangeSource::User)
            .into_event(
                AuditEventId::new(),
                Timestamp::from_micros(micros).unwrap(),
                "unknown",
            )
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(AuditFilter::new().matches(&event("visit-1", "dr", 10)));
    }

    #[test]
    fn test_resource_and_actor_criteria() {
        let filter = AuditFilter::for_resource("visit-1").actor("dr");
        assert!(filter.matches(&event("visit-1", "dr", 10)));
        assert!(!filter.matches(&event("visit-2", "dr", 10)));
        assert!(!filter.matches(&event("visit-1", "nurse", 10)));
    }

    #[test]
    fn test_action_matches_on_persisted_string() {
        let raw = AuditFilter::new().action(ClinicalAction::Unrecognized("field_updated".into()));
        assert!(raw.matches(&event("visit-1", "dr", 10)));

        let other = AuditFilter::new().action(ClinicalAction::ManualEdit);
        assert!(!other.matches(&event("visit-1", "dr", 10)));
    }

    #[test]
    fn test_time_range_is_inclusive() {
        let filter = AuditFilter::new()
            .since(Timestamp::from_micros(10).unwrap())
            .until(Timestamp::from_micros(20).unwrap());
        assert!(filter.matches(&event("v", "a", 10)));
        assert!(filter.matches(&event("v", "a", 20)));
        assert!(!filter.matches(&event("v", "a", 21)));
        assert!(!filter.matches(&event("v", "a", 9)));
    }

    #[test]
    fn test_validation() {
        assert!(AuditFilter::new().validate(100).is_ok());
        assert!(AuditFilter::new().limit(0).validate(100).is_err());
        assert!(AuditFilter::new().limit(101).validate(100).is_err());
        assert!(AuditFilter::for_resource(" ").validate(100).is_err());

        let inverted = AuditFilter::new()
            .since(Timestamp::from_micros(20).unwrap())
            .until(Timestamp::from_micros(10).unwrap());
        assert!(matches!(inverted.validate(100), Err(Error::Validation(_))));
    }
}
