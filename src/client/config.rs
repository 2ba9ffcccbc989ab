// Configuration module for the Dice Poker client

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::constants::{DEFAULT_API_BASE_URL, DEFAULT_SOCKET_URL};

// =============================================================================
// CONFIGURATION STRUCTURES
// =============================================================================

/// Game server endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Socket endpoint, `http(s)://` or `ws(s)://`
    #[serde(default = "default_socket_url")]
    pub socket_url: String,
    /// Base URL of the legacy REST surface
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_socket_url() -> String {
    DEFAULT_SOCKET_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            socket_url: default_socket_url(),
            api_base_url: default_api_base_url(),
        }
    }
}

/// Local player defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlayerSettings {
    /// Name used when none is given on the command line
    #[serde(default)]
    pub name: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Mirror logs to stderr (the terminal UI owns stdout)
    #[serde(default)]
    pub console: bool,
    /// Log file path (relative to the working directory or absolute). Empty = no file logging.
    #[serde(default)]
    pub log_file: String,
    /// Default filter level, overridden by `RUST_LOG`
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            console: false,
            log_file: String::new(),
            level: default_level(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub player: PlayerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

#[derive(Debug)]
pub enum ConfigError {
    ReadError(std::io::Error),
    ParseError(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::ParseError(e) => write!(f, "Failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub const CONFIG_FILENAME: &'static str = "dice_poker.toml";
    pub const ENV_SOCKET_URL: &'static str = "DICE_POKER_SOCKET_URL";
    pub const ENV_API_BASE_URL: &'static str = "DICE_POKER_API_BASE_URL";

    /// Default config location: next to the executable, else the working directory
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(Self::CONFIG_FILENAME)))
            .filter(|path| path.exists())
            .unwrap_or_else(|| PathBuf::from(Self::CONFIG_FILENAME))
    }

    /// Parse a TOML document
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(ConfigError::ParseError)
    }

    /// Load configuration from `path`
    ///
    /// A missing file yields defaults; an unreadable or invalid one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "[config] Looking for config");

        let config = if path.exists() {
            let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
            let config = Self::from_toml(&contents)?;
            info!(path = %path.display(), "[config] Loaded config");
            config
        } else {
            debug!("[config] No config found, using defaults");
            Config::default()
        };

        Ok(config)
    }

    /// Override endpoints from the command line or its environment
    /// fallbacks (`ENV_SOCKET_URL`, `ENV_API_BASE_URL`); blank values are ignored
    pub fn apply_overrides(&mut self, socket_url: Option<&str>, api_base_url: Option<&str>) {
        if let Some(url) = socket_url.map(str::trim).filter(|v| !v.is_empty()) {
            debug!(url = %url, "[config] Socket URL override");
            self.server.socket_url = url.to_string();
        }
        if let Some(url) = api_base_url.map(str::trim).filter(|v| !v.is_empty()) {
            debug!(url = %url, "[config] API base URL override");
            self.server.api_base_url = url.to_string();
        }
    }

    /// Resolved log file path, if file logging is enabled
    pub fn log_file_path(&self) -> Option<PathBuf> {
        let file = self.logging.log_file.trim();
        if file.is_empty() {
            None
        } else {
            Some(PathBuf::from(file))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_document() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.socket_url, "http://localhost:5000");
        assert_eq!(config.server.api_base_url, "http://localhost:5000/api");
        assert!(config.player.name.is_empty());
        assert!(!config.logging.console);
        assert_eq!(config.logging.level, "info");
        assert!(config.log_file_path().is_none());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            socket_url = "https://dados.example.com"

            [player]
            name = "Ana"

            [logging]
            log_file = "dice_poker.log"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.socket_url, "https://dados.example.com");
        assert_eq!(config.server.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.player.name, "Ana");
        assert_eq!(config.log_file_path(), Some(PathBuf::from("dice_poker.log")));
    }

    #[test]
    fn test_invalid_document_is_error() {
        let result = Config::from_toml("[server]\nsocket_url = 5");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/dir/dice_poker.toml")).unwrap();
        assert_eq!(config.player.name, "");
    }

    #[test]
    fn test_overrides_endpoints() {
        let mut config = Config::default();
        config.apply_overrides(Some("ws://10.0.0.2:5000/ws"), Some("  "));
        assert_eq!(config.server.socket_url, "ws://10.0.0.2:5000/ws");
        // Blank value ignored
        assert_eq!(config.server.api_base_url, "http://localhost:5000/api");

        config.apply_overrides(None, Some("http://10.0.0.2:5000/api"));
        assert_eq!(config.server.socket_url, "ws://10.0.0.2:5000/ws");
        assert_eq!(config.server.api_base_url, "http://10.0.0.2:5000/api");
    }

    #[test]
    fn test_config_error_display() {
        let err = Config::from_toml("not = [valid").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }
}
