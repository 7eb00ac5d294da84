// src/infrastructure/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{API_BASE_PATH, CONFIG_DIR_NAME, DEFAULT_HOST};

/// TOML configuration for the notes client
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// `host[:port]` of the backend; the API path is fixed
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_host() -> String { DEFAULT_HOST.to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Without one, the file in the platform
    /// config directory is used when present, otherwise defaults apply.
    /// `host_override` wins over whatever the file says.
    pub fn resolve(explicit: Option<&Path>, host_override: Option<&str>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                debug!(?path, "Loading config from explicit path");
                Self::load(path)
                    .with_context(|| format!("Cannot use config {}", path.display()))?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!(?path, "Loading config from default location");
                    Self::load(&path)?
                }
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        if let Some(host) = host_override {
            config.server.host = host.to_string();
        }
        Ok(config)
    }

    /// API root, e.g. `http://localhost:8080/api/v1`
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.server.host, API_BASE_PATH)
    }
}

/// `<config dir>/notedesk/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"))
}
