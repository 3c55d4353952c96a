//! Configuration types.

use serde::{Deserialize, Serialize};

/// Actor recorded when a change arrives without one.
pub const DEFAULT_ACTOR: &str = "unknown";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Storage backend.
    pub database: DatabaseConfig,
    /// Audit trail behaviour.
    pub audit: AuditConfig,
    /// Document signing behaviour.
    pub signing: SigningConfig,
}

/// SQLite storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file, or `:memory:`.
    pub path: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// How long a caller waits for a pooled connection (ms).
    pub acquire_timeout_ms: u64,
    /// How long a statement waits on a locked database (ms).
    pub busy_timeout_ms: u64,
    /// Use write-ahead logging.
    pub wal_mode: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "aidux.db".to_string(),
            max_connections: 10,
            acquire_timeout_ms: 30_000,
            busy_timeout_ms: 5_000,
            wal_mode: true,
        }
    }
}

impl DatabaseConfig {
    /// A private in-memory database, for tests and demos.
    pub fn in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
            max_connections: 1,
            wal_mode: false,
            ..Default::default()
        }
    }
}

/// Audit trail configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Sentinel actor for changes recorded without one.
    pub default_actor: String,
    /// Page size when a listing does not ask for one.
    pub default_list_limit: usize,
    /// Largest page a listing may ask for.
    pub max_list_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_actor: DEFAULT_ACTOR.to_string(),
            default_list_limit: 50,
            max_list_limit: 500,
        }
    }
}

/// Document signing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Sign every exported document.
    pub sign_on_export: bool,
    /// Re-check the stored signature right after signing an export.
    pub verify_after_sign: bool,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            sign_on_export: true,
            verify_after_sign: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IntegrityConfig::default();
        assert_eq!(config.database.path, "aidux.db");
        assert_eq!(config.database.max_connections, 10);
        assert!(config.database.wal_mode);
        assert_eq!(config.audit.default_actor, DEFAULT_ACTOR);
        assert_eq!(config.audit.default_list_limit, 50);
        assert_eq!(config.audit.max_list_limit, 500);
        assert!(config.signing.sign_on_export);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
database:
  path: /var/lib/aidux/integrity.db
audit:
  default_actor: system
"#;
        let config: IntegrityConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.database.path, "/var/lib/aidux/integrity.db");
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.audit.default_actor, "system");
        assert_eq!(config.audit.max_list_limit, 500);
        assert!(config.signing.verify_after_sign);
    }

    #[test]
    fn test_serializes_to_yaml() {
        let yaml = serde_yaml::to_string(&IntegrityConfig::default()).unwrap();
        assert!(yaml.contains("database:"));
        assert!(yaml.contains("default_actor: unknown"));
        assert!(yaml.contains("sign_on_export: true"));
    }
}
