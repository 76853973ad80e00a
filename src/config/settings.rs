use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub git: GitConfig,
    pub locator: LocatorConfig,
    pub history: HistoryConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GitConfig {
    pub binary: String,
    pub timeout_seconds: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Bounds on the nested-repository search
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LocatorConfig {
    pub max_depth: usize,
    pub max_visited: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_visited: 4096,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct HistoryConfig {
    /// Limit on cached commits; unlimited when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_commits: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    /// Defaults to ~/.config/gitstate/commands.log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("gitstate"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the config file
    pub fn load() -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(Self::config_path()?)?;
        Self::from_toml(&contents)
    }

    /// Load the config file, or defaults when there is none
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(ConfigError::ReadError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(ConfigError::DirectoryNotFound) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the config file
    pub fn save(&self) -> Result<(), ConfigError> {
        self.validate()?;

        fs::create_dir_all(Self::config_dir()?)?;
        let contents = toml::to_string_pretty(self)?;
        fs::write(Self::config_path()?, contents)?;

        Ok(())
    }

    /// Audit log location, if auditing is enabled
    pub fn audit_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        if !self.audit.enabled {
            return Ok(None);
        }
        match &self.audit.path {
            Some(path) => Ok(Some(path.clone())),
            None => Ok(Some(Self::config_dir()?.join("commands.log"))),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.git.binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "git.binary must not be empty".to_string(),
            ));
        }

        if self.git.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.locator.max_depth == 0 || self.locator.max_visited == 0 {
            return Err(ConfigError::InvalidValue(
                "locator limits must be greater than 0".to_string(),
            ));
        }

        if self.history.max_commits == Some(0) {
            return Err(ConfigError::InvalidValue(
                "max_commits must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}
