//! Application configuration
//!
//! Layers, lowest to highest precedence: built-in defaults, a config file
//! (JSON, TOML or YAML), `WAYFINDER_*` environment variables, command-line
//! flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use wayfinder_core::NavigationConfig;
use wayfinder_eye::ScanConfig;
use wayfinder_spk::{EngineKind, SpeechConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    pub scan: ScanConfig,
    pub speech: SpeechConfig,
    pub navigation: NavigationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            scan: ScanConfig::default(),
            speech: SpeechConfig::default(),
            navigation: NavigationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults or `path`, then environment overrides, then validation
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    /// Parse JSON, TOML or YAML, tried in that order
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        if let Ok(config) = serde_json::from_str::<AppConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = toml::from_str::<AppConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = serde_yaml::from_str::<AppConfig>(content) {
            return Ok(config);
        }

        Err(ConfigError::Parse("Unknown format".to_string()))
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply `WAYFINDER_*` overrides read through `lookup`. Unparsable values
    /// are ignored with a warning.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("WAYFINDER_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(path) = lookup("WAYFINDER_TOPOLOGY") {
            self.navigation.topology_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("WAYFINDER_MAP_IMAGE") {
            self.navigation.map_image = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("WAYFINDER_CAMERA_ID") {
            match value.parse() {
                Ok(id) => self.scan.camera_id = id,
                Err(_) => warn!("Ignoring WAYFINDER_CAMERA_ID={}", value),
            }
        }

        if let Some(value) = lookup("WAYFINDER_FEEDBACK_INTERVAL_MS") {
            match value.parse() {
                Ok(ms) => self.scan.feedback_interval_ms = ms,
                Err(_) => warn!("Ignoring WAYFINDER_FEEDBACK_INTERVAL_MS={}", value),
            }
        }

        if let Some(value) = lookup("WAYFINDER_RECOGNIZER_TIMEOUT_MS") {
            match value.parse() {
                Ok(ms) => self.navigation.recognizer_timeout_ms = ms,
                Err(_) => warn!("Ignoring WAYFINDER_RECOGNIZER_TIMEOUT_MS={}", value),
            }
        }

        if let Some(value) = lookup("WAYFINDER_SPEECH_ENGINE") {
            match value.parse::<EngineKind>() {
                Ok(engine) => self.speech.engine = engine,
                Err(e) => warn!("Ignoring WAYFINDER_SPEECH_ENGINE: {}", e),
            }
        }

        if let Some(value) = lookup("WAYFINDER_SPEECH_ENABLED") {
            match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.speech.enabled = true,
                "0" | "false" | "no" | "off" => self.speech.enabled = false,
                _ => warn!("Ignoring WAYFINDER_SPEECH_ENABLED={}", value),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan
            .validate()
            .map_err(|e| ConfigError::Validation(format!("scan: {}", e)))?;
        self.speech
            .validate()
            .map_err(|e| ConfigError::Validation(format!("speech: {}", e)))?;
        self.navigation
            .validate()
            .map_err(|e| ConfigError::Validation(format!("navigation: {}", e)))?;
        Ok(())
    }
}
