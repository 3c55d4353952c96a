//! Timestamp utilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC timestamp with microsecond storage precision.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current time, truncated to whole microseconds.
    pub fn now() -> Self {
        let now = Utc::now();
        Self::from_micros(now.timestamp_micros()).unwrap_or(Self(now))
    }

    /// From a DateTime.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// From microseconds since the Unix epoch, as persisted by the stores.
    pub fn from_micros(micros: i64) -> Option<Self> {
        DateTime::from_timestamp_micros(micros).map(Self)
    }

    /// Microseconds since the Unix epoch.
    pub fn as_micros(&self) -> i64 {
        self.0.timestamp_micros()
    }

    /// Get the inner DateTime.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// ISO 8601 string.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_timestamp_serialization() {
        let ts = Timestamp::now();
        let json = serde_json::to_string(&ts).unwrap();
        let deserialized: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, deserialized);
    }

    #[test]
    fn test_timestamp_display() {
        let ts = Timestamp::now();
        let display_str = ts.to_string();
        assert!(display_str.contains('T'));
        assert!(display_str.ends_with('Z') || display_str.ends_with("+00:00"));
    }

    #[test]
    fn test_now_survives_storage() {
        let ts = Timestamp::now();
        assert_eq!(Timestamp::from_micros(ts.as_micros()), Some(ts));
    }

    proptest! {
        #[test]
        fn test_micros_ordering_matches_timestamp_ordering(
            a in 0i64..4_102_444_800_000_000,
            b in 0i64..4_102_444_800_000_000,
        ) {
            let ta = Timestamp::from_micros(a).unwrap();
            let tb = Timestamp::from_micros(b).unwrap();
            prop_assert_eq!(a.cmp(&b), ta.cmp(&tb));
        }
    }
}
