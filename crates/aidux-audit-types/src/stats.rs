//! Aggregate counts over audit events.

use crate::AuditEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Event counts for an audit-history overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub total: u64,
    pub by_action: BTreeMap<String, u64>,
    pub by_actor: BTreeMap<String, u64>,
}

impl AuditStats {
    /// Count a batch of events.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a AuditEvent>) -> Self {
        let mut stats = Self::default();
        for event in events {
            stats.add(event);
        }
        stats
    }

    /// Count one event.
    pub fn add(&mut self, event: &AuditEvent) {
        self.total += 1;
        *self
            .by_action
            .entry(event.action.as_str().to_string())
            .or_default() += 1;
        *self.by_actor.entry(event.actor_id.clone()).or_default() += 1;
    }

    /// Share of events that involved the copilot assistant, in [0, 1].
    pub fn assistant_share(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let assisted: u64 = self
            .by_action
            .iter()
            .filter(|(action, _)| crate::ClinicalAction::parse(action).involves_assistant())
            .map(|(_, count)| count)
            .sum();
        assisted as f64 / self.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuditEventId, ClinicalAction};
    use aidux_common_core::Timestamp;

    fn event(action: ClinicalAction, actor: &str) -> AuditEvent {
        AuditEvent::builder("visit", "visit-1", action)
            .actor(actor)
            .into_event(AuditEventId::new(), Timestamp::now(), "unknown")
    }

    #[test]
    fn test_counts() {
        let events = vec![
            event(ClinicalAction::FieldUpdated, "dr"),
            event(ClinicalAction::FieldUpdated, "nurse"),
            event(ClinicalAction::AiSuggestionAccepted, "dr"),
        ];
        let stats = AuditStats::from_events(&events);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_action["field_updated"], 2);
        assert_eq!(stats.by_action["ai_suggestion_accepted"], 1);
        assert_eq!(stats.by_actor["dr"], 2);
        assert!((stats.assistant_share() - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats() {
        let stats = AuditStats::default();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.assistant_share(), 0.0);
    }
}
