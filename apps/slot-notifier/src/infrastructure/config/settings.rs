//! Notifier Configuration Settings
//!
//! Configuration types for the notifier, loaded from environment variables.

use std::path::{Path, PathBuf};

use crate::application::services::SharedSecret;
use crate::domain::notification::{KeywordTableError, KeywordTables};

/// Listener and queue settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// HTTP and WebSocket port.
    pub port: u16,
    /// Outbound queue depth per subscriber connection.
    pub outbox_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            outbox_capacity: 64,
        }
    }
}

/// Complete notifier configuration.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Ingestion shared secret.
    pub secret: SharedSecret,
    /// Listener settings.
    pub server: ServerSettings,
    /// Classifier keyword tables.
    pub keywords: KeywordTables,
}

impl NotifierConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `NOTIFY_SECRET` is missing or empty, or if
    /// `NOTIFIER_KEYWORDS_FILE` is set and cannot be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("NOTIFY_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("NOTIFY_SECRET".to_string()))?;

        if secret.is_empty() {
            return Err(ConfigError::EmptyValue("NOTIFY_SECRET".to_string()));
        }

        let server = ServerSettings {
            port: parse_env_u16("PORT", ServerSettings::default().port),
            outbox_capacity: parse_env_usize(
                "NOTIFIER_OUTBOX_CAPACITY",
                ServerSettings::default().outbox_capacity,
            )
            .max(1),
        };

        let keywords = match std::env::var_os("NOTIFIER_KEYWORDS_FILE") {
            Some(path) if !path.is_empty() => load_keywords(Path::new(&path))?,
            _ => KeywordTables::reference(),
        };

        Ok(Self {
            secret: SharedSecret::new(secret),
            server,
            keywords,
        })
    }
}

/// Load and validate keyword tables from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML for the
/// table shape, or fails validation.
pub fn load_keywords(path: &Path) -> Result<KeywordTables, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadKeywords {
        path: path.to_path_buf(),
        source,
    })?;

    KeywordTables::from_yaml_str(&contents).map_err(|source| match source {
        KeywordTableError::Parse(_) => ConfigError::ParseKeywords {
            path: path.to_path_buf(),
            source,
        },
        _ => ConfigError::InvalidKeywords {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Keyword file could not be read.
    #[error("failed to read keyword file {}: {source}", path.display())]
    ReadKeywords {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Keyword file is not valid YAML for the table shape.
    #[error("failed to parse keyword file {}: {source}", path.display())]
    ParseKeywords {
        /// File path.
        path: PathBuf,
        /// Underlying parse error.
        source: KeywordTableError,
    },
    /// Keyword file parsed but failed validation.
    #[error("invalid keyword file {}: {source}", path.display())]
    InvalidKeywords {
        /// File path.
        path: PathBuf,
        /// Validation failure.
        source: KeywordTableError,
    },
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
