//! Fleetdesk Configuration Module
//! Handles loading fleetdesk.config.json

use crate::engine::rbac::Role;
use crate::engine::users::DEFAULT_ID_SEED;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "fleetdesk.config.json";
/// Log filter used when neither the environment nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "fleetdesk_lib=warn,fleetdesk=warn";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config format: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    /// Role preselected on the user form
    #[serde(default = "default_role")]
    pub default_role: Role,
    /// Role shown first in the matrix editor
    #[serde(default = "selected_role")]
    pub selected_role: Role,
    #[serde(default = "default_id_seed")]
    pub user_id_seed: u32,
    #[serde(default)]
    pub log_filter: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_role() -> Role {
    Role::Agent
}

fn selected_role() -> Role {
    Role::Ops
}

fn default_id_seed() -> u32 {
    DEFAULT_ID_SEED
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            default_role: default_role(),
            selected_role: selected_role(),
            user_id_seed: default_id_seed(),
            log_filter: None,
        }
    }
}

impl Config {
    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE)
    }

    /// Load the project config, falling back to defaults when the file is absent.
    ///
    /// Runs before logging is set up, so callers report the outcome themselves.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::path(project_dir);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::ReadError {
            path: config_path.clone(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
