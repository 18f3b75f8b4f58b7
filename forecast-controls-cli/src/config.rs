//! Configuration loading and parsing

use crate::session::Action;
use anyhow::{Context, Result};
use forecast_controls::ControlsConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// UI actions replayed in order
    #[serde(default)]
    pub script: Vec<Action>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Without a base URL the session runs offline
    pub base_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    forecast_controls::requests::DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Report destination (default: stdout)
    pub output_file: Option<PathBuf>,
    /// Add GeoJSON for the forecast cells and region outline to the report
    #[serde(default)]
    pub include_features: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if config.backend.timeout_ms == 0 {
        anyhow::bail!("backend.timeout_ms must be positive in {:?}", path);
    }

    Ok(config)
}
