//! Probe configuration.
//!
//! The collaborator's address can come from a JSON config file, CLI
//! flags, or both; flags win over file values and anything unset falls
//! back to the store's stock address.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ProbeConfig {
    pub fn open(path: &Path) -> Result<ProbeConfig, ConfigError> {
        let contents = read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlays CLI-provided values on top of this config.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> ProbeConfig {
        if host.is_some() {
            self.host = host;
        }
        if port.is_some() {
            self.port = port;
        }
        self
    }

    pub fn base_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.host.as_deref().unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT)
        )
    }
}
