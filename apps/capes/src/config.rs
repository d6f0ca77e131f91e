//! # Configuration
//!
//! Runtime settings for the server and CLI, resolved in layers (lowest to
//! highest precedence):
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config path`)
//! 3. Environment variables (`CAPES_*`)
//! 4. Explicit command-line flags
//!
//! ## Environment Variables
//!
//! - `CAPES_HOST`, `CAPES_PORT`: bind address
//! - `CAPES_DATABASE`: path of the redb file
//! - `CAPES_BACKEND`: `redb` or `memory`
//! - `CAPES_CORS_ORIGINS`: comma-separated origins, or `*` for all
//! - `CAPES_RATE_LIMIT`: requests per second (0 disables)
//! - `CAPES_PAGE_SIZE`: default listing page size

use capes_core::primitives::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default rate limit: 100 requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Which store backs the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// ACID database file.
    #[default]
    Redb,
    /// Volatile, lost on exit. Writable only through `server`.
    Memory,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redb => f.write_str("redb"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    pub backend: Backend,
    /// `None` means localhost origins only.
    pub cors_origins: Option<String>,
    pub rate_limit: u32,
    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: PathBuf::from("capes.db"),
            backend: Backend::default(),
            cors_origins: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
    pub backend: Option<Backend>,
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl Settings {
    /// Defaults, then the file (if any), then the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Defaults overlaid with a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(settings.normalized())
    }

    /// Overlay `CAPES_*` variables read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("CAPES_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("CAPES_PORT") {
            self.port = parse_env("CAPES_PORT", &port)?;
        }
        if let Some(database) = lookup("CAPES_DATABASE") {
            self.database = PathBuf::from(database);
        }
        if let Some(backend) = lookup("CAPES_BACKEND") {
            self.backend =
                Backend::from_str(backend.trim(), true).map_err(|_| ConfigError::InvalidValue {
                    key: "CAPES_BACKEND".to_string(),
                    value: backend.clone(),
                })?;
        }
        if let Some(origins) = lookup("CAPES_CORS_ORIGINS") {
            self.cors_origins = Some(origins);
        }
        if let Some(rate) = lookup("CAPES_RATE_LIMIT") {
            self.rate_limit = parse_env("CAPES_RATE_LIMIT", &rate)?;
        }
        if let Some(size) = lookup("CAPES_PAGE_SIZE") {
            self.page_size = parse_env("CAPES_PAGE_SIZE", &size)?;
        }
        *self = self.clone().normalized();
        Ok(())
    }

    /// Overlay explicit command-line values.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(host) = &overrides.host {
            self.host.clone_from(host);
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(database) = &overrides.database {
            self.database.clone_from(database);
        }
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
    }

    /// `host:port` for binding.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn normalized(mut self) -> Self {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self.page_size = self.page_size.min(MAX_PAGE_SIZE);
        self
    }
}
