//! Configuration management module.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(EmulatorConfig),
    /// Config file missing; defaults apply.
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Emulator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmulatorConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server connection settings, enforced on the TCP socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_read_timeout_secs() -> u64 {
    30
}

fn default_write_timeout_secs() -> u64 {
    10
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for a daily log file. Empty means stderr only.
    #[serde(default)]
    pub directory: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl EmulatorConfig {
    /// Get config file path (user config directory, else current directory).
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "rnis-emulator")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<EmulatorConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.connect_timeout_secs < 1 {
            return Err(ConfigError::Validation(
                "Connect timeout must be at least 1 second".to_string(),
            ));
        }
        if self.connection.read_timeout_secs < 1 {
            return Err(ConfigError::Validation("Read timeout must be at least 1 second".to_string()));
        }
        if self.connection.write_timeout_secs < 1 {
            return Err(ConfigError::Validation("Write timeout must be at least 1 second".to_string()));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level '{}' (expected one of: {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            write_timeout_secs: default_write_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = EmulatorConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: EmulatorConfig = toml::from_str("[connection]\nread_timeout_secs = 5\n").unwrap();
        assert_eq!(config.connection.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.connection.connect_timeout_secs, 10);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_validation_zero_timeouts() {
        let mut config = EmulatorConfig::default();
        config.connection.connect_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = EmulatorConfig::default();
        config.connection.read_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = EmulatorConfig::default();
        config.connection.write_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_log_level() {
        let mut config = EmulatorConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());

        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("rnis-emulator-missing").join("config.toml");
        assert!(matches!(EmulatorConfig::try_load(&path), ConfigLoadResult::Missing));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("rnis-emulator-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = EmulatorConfig::default();
        config.connection.read_timeout_secs = 7;
        config.logging.level = "debug".to_string();
        config.save(&path).unwrap();

        match EmulatorConfig::try_load(&path) {
            ConfigLoadResult::Loaded(loaded) => assert_eq!(loaded, config),
            other => panic!("unexpected load result: {other:?}"),
        }

        std::fs::write(&path, "[connection]\nread_timeout_secs = 0\n").unwrap();
        assert!(matches!(EmulatorConfig::try_load(&path), ConfigLoadResult::Invalid(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
