//! Origin of a recorded change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced the change: a clinician directly, or the copilot assistant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeSource {
    User,
    Copilot,
    /// Pass-through for values outside the known taxonomy.
    Unrecognized(String),
}

impl ChangeSource {
    /// The persisted string form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Copilot => "copilot",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Map a persisted string back to a source. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "user" => Self::User,
            "copilot" => Self::Copilot,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Whether this value fell outside the taxonomy when read.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }
}

impl Default for ChangeSource {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ChangeSource {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ChangeSource> for String {
    fn from(source: ChangeSource) -> Self {
        match source {
            ChangeSource::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}
