//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/snipshare/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/snipshare/` (~/.config/snipshare/)
//! - Data: `$XDG_DATA_HOME/snipshare/` (~/.local/share/snipshare/)
//! - State/Logs: `$XDG_STATE_HOME/snipshare/` (~/.local/state/snipshare/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that selects the API origin.
pub const API_URL_ENV: &str = "SNIPSHARE_API_URL";

/// Environment variable that names the volatile session partition.
pub const SESSION_ENV: &str = "SNIPSHARE_SESSION";

/// API base used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/snippets";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Snippet API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Editor timing settings
    #[serde(default)]
    pub editor: EditorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snippet API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// API base URL (e.g., `https://snips.example.com/api/snippets`)
    pub base_url: Option<String>,

    /// Public origin used to build share links
    pub origin: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            origin: None,
            timeout_secs: default_api_timeout(),
        }
    }
}

fn default_api_timeout() -> u64 {
    30
}

/// Where the API base URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiUrlSource {
    Env,
    ConfigFile,
    /// Nothing configured; the local default is in use and callers should warn.
    Fallback,
}

impl ApiUrlSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiUrlSource::Env => "env",
            ApiUrlSource::ConfigFile => "config",
            ApiUrlSource::Fallback => "fallback",
        }
    }
}

/// Resolved API endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub base_url: String,
    pub source: ApiUrlSource,
}

impl ApiEndpoint {
    pub fn is_fallback(&self) -> bool {
        self.source == ApiUrlSource::Fallback
    }
}

impl ApiConfig {
    /// Resolve the base URL: environment, then config file, then the local default.
    pub fn endpoint(&self) -> ApiEndpoint {
        let from_env = std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty());
        self.endpoint_with(from_env.as_deref())
    }

    fn endpoint_with(&self, from_env: Option<&str>) -> ApiEndpoint {
        let (url, source) = match (from_env, self.base_url.as_deref()) {
            (Some(url), _) => (url, ApiUrlSource::Env),
            (None, Some(url)) if !url.trim().is_empty() => (url, ApiUrlSource::ConfigFile),
            _ => (DEFAULT_API_URL, ApiUrlSource::Fallback),
        };

        if source == ApiUrlSource::Fallback {
            tracing::warn!(
                url = DEFAULT_API_URL,
                "No API base URL configured, falling back to local default"
            );
        }

        ApiEndpoint {
            base_url: url.trim().trim_end_matches('/').to_string(),
            source,
        }
    }

    /// Share-link origin; derived from the base URL when not set.
    ///
    /// `https://host/api/snippets` becomes `https://host`.
    pub fn share_origin(&self, endpoint: &ApiEndpoint) -> String {
        if let Some(origin) = self.origin.as_deref().filter(|o| !o.trim().is_empty()) {
            return origin.trim_end_matches('/').to_string();
        }

        let base = endpoint.base_url.as_str();
        let after_scheme = base.find("://").map(|i| i + 3).unwrap_or(0);
        match base[after_scheme..].find('/') {
            Some(slash) => base[..after_scheme + slash].to_string(),
            None => base.to_string(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Editor timing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    /// Idle time before a dirty draft is pushed to the autosave endpoint
    #[serde(default = "default_autosave_delay")]
    pub autosave_delay_ms: u64,

    /// Idle time before the local draft record is rewritten
    #[serde(default = "default_draft_persist_delay")]
    pub draft_persist_delay_ms: u64,

    /// Debounce for semantic history search input
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: default_autosave_delay(),
            draft_persist_delay_ms: default_draft_persist_delay(),
            search_debounce_ms: default_search_debounce(),
        }
    }
}

impl EditorConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn draft_persist_delay(&self) -> Duration {
        Duration::from_millis(self.draft_persist_delay_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn default_autosave_delay() -> u64 {
    2000
}

fn default_draft_persist_delay() -> u64 {
    1000
}

fn default_search_debounce() -> u64 {
    500
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/snipshare/config.toml` (~/.config/snipshare/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("snipshare").join("config.toml")
    }

    /// Returns the data directory path (persistent draft + preferences)
    ///
    /// `$XDG_DATA_HOME/snipshare/` (~/.local/share/snipshare/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("snipshare")
    }

    /// Returns the state directory path (for logs and session partitions)
    ///
    /// `$XDG_STATE_HOME/snipshare/` (~/.local/state/snipshare/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("snipshare")
    }

    /// Returns the directory backing one volatile session partition
    ///
    /// `$XDG_STATE_HOME/snipshare/sessions/<name>/`
    pub fn session_dir(name: &str) -> PathBuf {
        Self::state_dir().join("sessions").join(name)
    }

    /// Session partition name from `SNIPSHARE_SESSION`, or `default`.
    pub fn session_name() -> String {
        std::env::var(SESSION_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "default".to_string())
    }

    /// A new, unique partition name for a throwaway session.
    pub fn fresh_session_name() -> String {
        format!("tmp-{}", uuid::Uuid::new_v4().simple())
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api.base_url.is_none());
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.editor.autosave_delay_ms, 2000);
        assert_eq!(config.editor.draft_persist_delay_ms, 1000);
        assert_eq!(config.editor.search_debounce_ms, 500);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[api]
base_url = "https://snips.example.com/api/snippets/"
timeout_secs = 10

[editor]
autosave_delay_ms = 3000

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.editor.autosave_delay_ms, 3000);
        assert_eq!(config.editor.draft_persist_delay_ms, 1000);
        assert_eq!(config.logging.level, "debug");

        let endpoint = config.api.endpoint_with(None);
        assert_eq!(endpoint.base_url, "https://snips.example.com/api/snippets");
        assert_eq!(endpoint.source, ApiUrlSource::ConfigFile);
    }

    #[test]
    fn test_endpoint_precedence() {
        let api = ApiConfig {
            base_url: Some("https://file.example.com/api".to_string()),
            ..Default::default()
        };
        let endpoint = api.endpoint_with(Some("https://env.example.com/api"));
        assert_eq!(endpoint.base_url, "https://env.example.com/api");
        assert_eq!(endpoint.source, ApiUrlSource::Env);
    }

    #[test]
    fn test_endpoint_fallback() {
        let endpoint = ApiConfig::default().endpoint_with(None);
        assert_eq!(endpoint.base_url, DEFAULT_API_URL);
        assert!(endpoint.is_fallback());
    }

    #[test]
    fn test_share_origin() {
        let api = ApiConfig::default();
        let endpoint = api.endpoint_with(Some("https://snips.example.com/api/snippets"));
        assert_eq!(api.share_origin(&endpoint), "https://snips.example.com");

        let api = ApiConfig {
            origin: Some("https://share.example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(api.share_origin(&endpoint), "https://share.example.com");
    }
}
