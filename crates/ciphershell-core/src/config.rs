use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::gateway::DEFAULT_GATEWAY_URL;
use crate::theme::{find_theme, DEFAULT_THEME};

pub const GATEWAY_ENV: &str = "CIPHERSHELL_GATEWAY";
pub const LOG_FILE_ENV: &str = "CIPHERSHELL_LOG_FILE";

/// Shell configuration, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CipherConfig {
    /// Base URL of the crypto gateway
    pub gateway_url: String,

    /// Theme id active at startup
    pub theme: String,

    /// Append debug logs to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            theme: DEFAULT_THEME.to_string(),
            log_file: None,
        }
    }
}

impl CipherConfig {
    /// `<config dir>/ciphershell/config.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ciphershell").join("config.json"))
    }

    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize config")
    }

    /// Load `path` if given, else the default file when it exists, else
    /// defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(default) if default.is_file() => Self::load(&default),
            _ => Ok(Self::default()),
        }
    }

    /// Apply `CIPHERSHELL_GATEWAY` / `CIPHERSHELL_LOG_FILE` on top.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(GATEWAY_ENV).ok(),
            std::env::var_os(LOG_FILE_ENV).map(PathBuf::from),
        )
    }

    pub fn with_overrides(mut self, gateway_url: Option<String>, log_file: Option<PathBuf>) -> Self {
        if let Some(url) = gateway_url.filter(|u| !u.is_empty()) {
            self.gateway_url = url;
        }
        if let Some(path) = log_file {
            self.log_file = Some(path);
        }
        self
    }

    /// Whether the configured theme exists.
    pub fn theme_is_known(&self) -> bool {
        find_theme(&self.theme).is_some()
    }
}
