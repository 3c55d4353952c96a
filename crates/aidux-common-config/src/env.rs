//! Environment variable handling.

use crate::types::IntegrityConfig;
use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("required environment variable not set: {var}")]
    NotSet { var: String },

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Configuration
    pub const AIDUX_CONFIG_DIR: &str = "AIDUX_CONFIG_DIR";
    pub const AIDUX_ENV: &str = "AIDUX_ENV";

    // Overrides
    pub const AIDUX_DATABASE_PATH: &str = "AIDUX_DATABASE_PATH";
    pub const AIDUX_DATABASE_MAX_CONNECTIONS: &str = "AIDUX_DATABASE_MAX_CONNECTIONS";
    pub const AIDUX_DEFAULT_ACTOR: &str = "AIDUX_DEFAULT_ACTOR";
    pub const AIDUX_SIGN_ON_EXPORT: &str = "AIDUX_SIGN_ON_EXPORT";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from .env files.
    pub fn init() -> Result<Self, EnvError> {
        // Later files override earlier ones.
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");

        if let Ok(env) = env::var(vars::AIDUX_ENV) {
            let _ = dotenvy::from_filename(format!(".env.{}", env));
        }

        Ok(Self { _guard: () })
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        env::var(var).map_err(|_| EnvError::NotSet { var: var.to_string() })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get a variable with a default value.
    pub fn get_or(var: &str, default: &str) -> String {
        env::var(var).unwrap_or_else(|_| default.to_string())
    }

    pub fn is_production() -> bool {
        env::var(vars::AIDUX_ENV)
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Apply `AIDUX_*` overrides from the process environment.
pub fn apply_env_overrides(config: &mut IntegrityConfig) -> Result<(), EnvError> {
    apply_overrides_from(config, |var| env::var(var).ok())
}

/// Apply overrides using `lookup` as the variable source.
pub fn apply_overrides_from<F>(config: &mut IntegrityConfig, lookup: F) -> Result<(), EnvError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(vars::AIDUX_DATABASE_PATH) {
        config.database.path = path;
    }

    if let Some(raw) = lookup(vars::AIDUX_DATABASE_MAX_CONNECTIONS) {
        config.database.max_connections =
            raw.trim().parse().map_err(|_| EnvError::InvalidValue {
                var: vars::AIDUX_DATABASE_MAX_CONNECTIONS.to_string(),
                message: "expected integer".to_string(),
            })?;
    }

    if let Some(actor) = lookup(vars::AIDUX_DEFAULT_ACTOR) {
        if !actor.trim().is_empty() {
            config.audit.default_actor = actor;
        }
    }

    if let Some(raw) = lookup(vars::AIDUX_SIGN_ON_EXPORT) {
        config.signing.sign_on_export =
            parse_bool(&raw).ok_or_else(|| EnvError::InvalidValue {
                var: vars::AIDUX_SIGN_ON_EXPORT.to_string(),
                message: "expected true or false".to_string(),
            })?;
    }

    Ok(())
}
