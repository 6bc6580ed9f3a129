//! Configuration management for `TripCraft`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripCraftError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable consulted when no API key is configured explicitly
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Root configuration structure for `TripCraft`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripCraftConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Completion service settings
    pub completion: CompletionConfig,
    /// Planner session settings
    pub session: SessionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

/// Completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// API key (falls back to `OPENAI_API_KEY`)
    pub api_key: Option<String>,
    /// Base URL of the OpenAI compatible API
    pub base_url: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    pub max_retries: u32,
}

/// Planner session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are discarded
    pub idle_timeout_minutes: u32,
    /// Upper bound on live sessions; the least recently used one is evicted beyond it
    pub max_sessions: usize,
}

impl SessionConfig {
    /// Idle timeout as a `Duration`
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.idle_timeout_minutes) * 60)
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_timeout() -> u32 {
    120
}

fn default_max_retries() -> u32 {
    2
}

fn default_idle_timeout() -> u32 {
    120
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TripCraftConfig {
    /// Load configuration from `config_path`, or the default file location, then the environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("tripcraft.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPCRAFT_COMPLETION__MODEL=gpt-4o overrides completion.model
        builder = builder.add_source(
            Environment::with_prefix("TRIPCRAFT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripCraftConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.resolve_api_key(std::env::var(API_KEY_ENV).ok());
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripcraft").join("config.toml"))
    }

    /// Replace empty or zero values with their defaults
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.completion.base_url.is_empty() {
            self.completion.base_url = default_base_url();
        }
        if self.completion.model.is_empty() {
            self.completion.model = default_model();
        }
        if self.completion.timeout_seconds == 0 {
            self.completion.timeout_seconds = default_timeout();
        }
        if self.session.idle_timeout_minutes == 0 {
            self.session.idle_timeout_minutes = default_idle_timeout();
        }
        if self.session.max_sessions == 0 {
            self.session.max_sessions = default_max_sessions();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Use the fallback key when none is configured
    pub fn resolve_api_key(&mut self, fallback: Option<String>) {
        let configured = self
            .completion
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if !configured {
            self.completion.api_key = fallback.filter(|key| !key.trim().is_empty());
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(TripCraftError::config("Server port must be non-zero").into());
        }

        if self.completion.timeout_seconds > 600 {
            return Err(
                TripCraftError::config("Completion timeout cannot exceed 600 seconds").into(),
            );
        }

        if self.completion.max_retries > 10 {
            return Err(TripCraftError::config("Completion max retries cannot exceed 10").into());
        }

        if self.session.idle_timeout_minutes > 7 * 24 * 60 {
            return Err(
                TripCraftError::config("Session idle timeout cannot exceed one week").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripCraftError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripCraftError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.completion.base_url.starts_with("http://")
            && !self.completion.base_url.starts_with("https://")
        {
            return Err(TripCraftError::config(
                "Completion base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if self.completion.model.trim().is_empty() {
            return Err(TripCraftError::config("Completion model cannot be empty").into());
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TripCraftConfig::default();
        assert_eq!(config.completion.base_url, "https://api.openai.com/v1");
        assert_eq!(config.completion.model, "gpt-4");
        assert_eq!(config.completion.timeout_seconds, 120);
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.logging.level, "info");
        assert!(config.completion.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TripCraftConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TripCraftConfig::default();
        config.completion.timeout_seconds = 900;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = TripCraftConfig::default();
        config.completion.base_url = "api.openai.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_defaults() {
        let mut config = TripCraftConfig::default();
        assert_eq!(config.session.max_sessions, 10_000);
        assert_eq!(config.session.idle_timeout(), Duration::from_secs(120 * 60));

        config.session.max_sessions = 0;
        config.apply_defaults();
        assert_eq!(config.session.max_sessions, 10_000);
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = TripCraftConfig::default();
        config.completion.model = String::new();
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.completion.model, "gpt-4");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_resolve_api_key_prefers_configured() {
        let mut config = TripCraftConfig::default();
        config.completion.api_key = Some("sk-configured".to_string());
        config.resolve_api_key(Some("sk-env".to_string()));
        assert_eq!(config.completion.api_key.as_deref(), Some("sk-configured"));
    }

    #[test]
    fn test_resolve_api_key_uses_fallback() {
        let mut config = TripCraftConfig::default();
        config.completion.api_key = Some("  ".to_string());
        config.resolve_api_key(Some("sk-env".to_string()));
        assert_eq!(config.completion.api_key.as_deref(), Some("sk-env"));

        let mut config = TripCraftConfig::default();
        config.resolve_api_key(Some(String::new()));
        assert!(config.completion.api_key.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[completion]\nmodel = \"gpt-4o\"\nmax_retries = 0"
        )
        .unwrap();

        let config = TripCraftConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.completion.model, "gpt-4o");
        assert_eq!(config.completion.max_retries, 0);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = TripCraftConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("tripcraft"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
