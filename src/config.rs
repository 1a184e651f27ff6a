//! Service configuration.
//!
//! Settings come from a TOML file (default `config/reefmon.toml`, overridable
//! via the `REEFMON_CONFIG` environment variable; `.env` files are honored).
//! A missing default file falls back to built-in defaults so the service can
//! run out of a fresh checkout; an explicitly configured path that cannot be
//! read is an error.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const CONFIG_PATH_ENV: &str = "REEFMON_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/reefmon.toml";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub artifacts: ArtifactConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory of the bundled front end, served at the root path.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the chat-completion endpoint.
    pub base_url: String,
    /// Model name passed through to the endpoint.
    pub model: String,
    /// Total deadline for the non-streaming classification call, seconds.
    pub timeout_secs: u64,
    /// Sampling temperature for classification (kept low so replies stay
    /// close to a bare number).
    pub classify_temperature: f64,
    /// Sampling temperature for the conversational relay.
    pub chat_temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            timeout_secs: 30,
            classify_temperature: 0.1,
            chat_temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        ArtifactConfig {
            model_path: PathBuf::from("artifacts/bleach_model.json"),
            scaler_path: PathBuf::from("artifacts/feature_scaler.json"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl AppConfig {
    /// Loads configuration from the environment-selected or default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(Path::new(&path)),
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load(path)
                } else {
                    info!(
                        "no config file at {DEFAULT_CONFIG_PATH}, using built-in defaults"
                    );
                    Ok(AppConfig::default())
                }
            }
        }
    }

    /// Loads configuration from an explicit path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_the_development_setup() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.llm.model, "llama3.1");
        assert_eq!(config.llm.timeout_secs, 30);
    }

    #[test]
    fn test_partial_config_file_keeps_defaults_for_missing_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server]\nport = 9100\n").unwrap();

        let config = AppConfig::load(file.path()).expect("partial config must load");
        assert_eq!(config.server.port, 9100);
        assert_eq!(
            config.server.host, "127.0.0.1",
            "unspecified keys fall back to defaults"
        );
        assert_eq!(config.llm.model, "llama3.1");
    }

    #[test]
    fn test_malformed_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server\nport = ").unwrap();
        assert!(matches!(
            AppConfig::load(file.path()).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let err = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
