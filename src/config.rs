//! Application configuration
//!
//! Everything can come from a TOML file; command-line flags override it.
//!
//! ```toml
//! log_file = "cosmic-tracer.log"
//!
//! [game]
//! grid_width = 40
//! grid_height = 30
//! wrap_around = false
//!
//! [service]
//! base_url = "https://tracer.example.com"
//! timeout_ms = 3000
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::game::GameConfig;

/// Environment variable holding the bearer token for score submission
pub const TOKEN_ENV: &str = "COSMIC_TRACER_TOKEN";

/// Where and how to reach the external score service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the service; submission is off when unset
    pub base_url: Option<String>,
    /// Bearer token sent with submissions
    pub token: Option<String>,
    /// Per-request timeout; kept short so a dead service fails fast
    pub timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_ms: 3_000,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub service: ServiceConfig,
    /// Best-score file; defaults to the platform data directory
    pub best_score_path: Option<PathBuf>,
    /// Log destination; the terminal UI owns stdout/stderr
    pub log_file: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Read a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse config")
    }

    /// Fill the service token from the environment if the file left it out
    pub fn with_token_from_env(mut self) -> Self {
        if self.service.token.is_none() {
            self.service.token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        }
        self
    }
}
