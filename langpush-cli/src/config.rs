//! Loading of `langpush.toml`.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [catalog]
//! path = "catalog.json"
//!
//! [storage]
//! dir = "public"
//! base_url = "https://cdn.example.com"
//!
//! [[tokens]]
//! token = "secret"
//! caller = "ci"
//! kind = "client"
//! projects = ["*"]
//! ```

use std::{
    collections::HashSet,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use langpush::TokenGrant;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "langpush.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    pub storage: StorageSettings,
    pub tokens: Vec<TokenGrant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// JSON term catalog. The server starts empty without one.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory receiving pushed files. Without it pushes return the files inline.
    pub dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

impl Settings {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|e| {
            ConfigError::ValidationErrors(vec![ValidationError::new(
                "server.bind",
                format!("`{}` is not a socket address: {}", self.server.bind, e),
            )])
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if let Err(ConfigError::ValidationErrors(bind_errors)) = self.bind_addr() {
            errors.extend(bind_errors);
        }

        let mut seen = HashSet::new();
        for (i, grant) in self.tokens.iter().enumerate() {
            if grant.token.trim().is_empty() {
                errors.push(ValidationError::new(format!("tokens[{}].token", i), "must not be empty"));
            } else if !seen.insert(grant.token.as_str()) {
                errors.push(ValidationError::new(
                    format!("tokens[{}].token", i),
                    "is already used by another entry",
                ));
            }
            if grant.caller.trim().is_empty() {
                errors.push(ValidationError::new(format!("tokens[{}].caller", i), "must not be empty"));
            }
        }

        if self.storage.base_url.is_some() && self.storage.dir.is_none() {
            errors.push(ValidationError::new("storage.base_url", "requires storage.dir"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationErrors(errors))
        }
    }
}

/// Reads settings from `path`.
pub fn load_from_file(path: &Path) -> Result<Settings, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", path);
    let content = std::fs::read_to_string(path)?;
    Settings::from_toml_str(&content)
}

/// Reads the explicit `path`, else `langpush.toml` in `dir` when present,
/// else the defaults.
pub fn load(path: Option<&Path>, dir: &Path) -> Result<Settings, ConfigError> {
    if let Some(path) = path {
        return load_from_file(path);
    }
    let default_path = dir.join(CONFIG_FILE_NAME);
    if !default_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", default_path);
        return Ok(Settings::default());
    }
    load_from_file(&default_path)
}
