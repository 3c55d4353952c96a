//! Clinical audit actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};

/// What happened to a clinical record field.
///
/// Persisted as the snake_case strings below. A value read back from storage
/// that is not part of the taxonomy is kept verbatim in [`ClinicalAction::Unrecognized`]
/// so older readers can still display newer rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClinicalAction {
    FieldUpdated,
    ManualEdit,
    AiSuggestionAccepted,
    AiSuggestionModified,
    AiSuggestionRejected,
    SuggestionAccepted,
    CopilotIntervention,
    FormSubmitted,
    TestEvent,
    /// Pass-through for values outside the known taxonomy.
    Unrecognized(String),
}

impl ClinicalAction {
    /// All actions in the closed taxonomy.
    pub fn known() -> impl Iterator<Item = Self> {
        Self::iter().filter(|a| !a.is_unrecognized())
    }

    /// The persisted string form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::FieldUpdated => "field_updated",
            Self::ManualEdit => "manual_edit",
            Self::AiSuggestionAccepted => "ai_suggestion_accepted",
            Self::AiSuggestionModified => "ai_suggestion_modified",
            Self::AiSuggestionRejected => "ai_suggestion_rejected",
            Self::SuggestionAccepted => "suggestion_accepted",
            Self::CopilotIntervention => "copilot_intervention",
            Self::FormSubmitted => "form_submitted",
            Self::TestEvent => "test_event",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Map a persisted string back to an action. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "field_updated" => Self::FieldUpdated,
            "manual_edit" => Self::ManualEdit,
            "ai_suggestion_accepted" => Self::AiSuggestionAccepted,
            "ai_suggestion_modified" => Self::AiSuggestionModified,
            "ai_suggestion_rejected" => Self::AiSuggestionRejected,
            "suggestion_accepted" => Self::SuggestionAccepted,
            "copilot_intervention" => Self::CopilotIntervention,
            "form_submitted" => Self::FormSubmitted,
            "test_event" => Self::TestEvent,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Whether this value fell outside the taxonomy when read.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }

    /// Whether the change involved an AI assistant's proposal.
    pub fn involves_assistant(&self) -> bool {
        matches!(
            self,
            Self::AiSuggestionAccepted
                | Self::AiSuggestionModified
                | Self::AiSuggestionRejected
                | Self::SuggestionAccepted
                | Self::CopilotIntervention
        )
    }
}

impl fmt::Display for ClinicalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClinicalAction {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for ClinicalAction {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ClinicalAction> for String {
    fn from(action: ClinicalAction) -> Self {
        match action {
            ClinicalAction::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_taxonomy() {
        let names: Vec<String> = ClinicalAction::known().map(String::from).collect();
        assert_eq!(
            names,
            vec![
                "field_updated",
                "manual_edit",
                "ai_suggestion_accepted",
                "ai_suggestion_modified",
                "ai_suggestion_rejected",
                "suggestion_accepted",
                "copilot_intervention",
                "form_submitted",
                "test_event",
            ]
        );
    }

    #[test]
    fn test_known_actions_map_both_ways() {
        for action in ClinicalAction::known() {
            assert_eq!(ClinicalAction::parse(action.as_str()), action);
        }
    }

    #[test]
    fn test_unrecognized_passes_through() {
        let action = ClinicalAction::parse("voice_dictation");
        assert_eq!(action, ClinicalAction::Unrecognized("voice_dictation".into()));
        assert_eq!(action.to_string(), "voice_dictation");
    }

    #[test]
    fn test_serde_uses_persisted_strings() {
        let json = serde_json::to_string(&ClinicalAction::AiSuggestionModified).unwrap();
        assert_eq!(json, "\"ai_suggestion_modified\"");

        let parsed: ClinicalAction = serde_json::from_str("\"legacy_action\"").unwrap();
        assert!(parsed.is_unrecognized());
    }

    #[test]
    fn test_involves_assistant() {
        assert!(ClinicalAction::CopilotIntervention.involves_assistant());
        assert!(ClinicalAction::AiSuggestionRejected.involves_assistant());
        assert!(!ClinicalAction::ManualEdit.involves_assistant());
        assert!(!ClinicalAction::FormSubmitted.involves_assistant());
    }

    proptest! {
        #[test]
        fn test_any_string_survives_mapping(s in "\\PC*") {
            let parsed = ClinicalAction::parse(&s);
            prop_assert_eq!(parsed.as_str(), s.as_str());
        }
    }
}
