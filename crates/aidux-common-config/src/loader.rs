//! Configuration file loading and parsing.

use crate::env::{apply_env_overrides, EnvError};
use crate::types::IntegrityConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory, relative to the project root, holding `config.yaml`.
pub const CONFIG_DIR: &str = ".aidux";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error(transparent)]
    Env(#[from] EnvError),
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the configuration file this loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_DIR).join("config.yaml")
    }

    /// Load configuration from `.aidux/config.yaml`.
    ///
    /// A missing file yields the defaults.
    pub fn load(&self) -> Result<IntegrityConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(IntegrityConfig::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        self.parse(&contents)
    }

    /// Load the file, then apply `AIDUX_*` environment overrides.
    pub fn load_with_env(&self) -> Result<IntegrityConfig, ConfigError> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse and validate YAML contents.
    pub fn parse(&self, contents: &str) -> Result<IntegrityConfig, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let config: IntegrityConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(config: &IntegrityConfig) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::invalid("database.path must not be empty"));
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections must be greater than 0",
            ));
        }
        if config.audit.default_actor.trim().is_empty() {
            return Err(ConfigError::invalid("audit.default_actor must not be empty"));
        }
        if config.audit.default_list_limit == 0 {
            return Err(ConfigError::invalid(
                "audit.default_list_limit must be greater than 0",
            ));
        }
        if config.audit.default_list_limit > config.audit.max_list_limit {
            return Err(ConfigError::invalid(
                "audit.default_list_limit must not exceed audit.max_list_limit",
            ));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, config: &IntegrityConfig) -> Result<(), ConfigError> {
        let config_dir = self.base_path.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)?;

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(self.config_path(), yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| ConfigError::ParseError {
        line: None,
        message: e.to_string(),
    })?;

    let mut result = content.to_string();
    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(&cap[0], &value);
    }

    Ok(result)
}
