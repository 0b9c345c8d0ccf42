//! `sitegantt.toml` loading
//!
//! ```toml
//! [project]
//! project_type = "building"
//! detail_level = "detail"
//! floor_count = 12
//! start_date = "2025-03-01"
//!
//! [expansion]
//! floor_stagger_days = 7
//! floor_window_days = 30
//!
//! [gantt]
//! day_width = 24.0
//! row_height = 32.0
//! ```
//!
//! Every table is optional. `[project]` owns the floor count and start date;
//! the same keys under `[expansion]` are overwritten by it.

use serde::Deserialize;
use sitegantt_core::ProjectSettings;
use sitegantt_engine::ExpansionConfig;
use sitegantt_render::GanttLayout;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "sitegantt.toml";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub project: ProjectSettings,
    pub expansion: ExpansionConfig,
    pub gantt: GanttLayout,
}

impl CliConfig {
    /// Expansion parameters with the project's floor count and start applied
    pub fn expansion_config(&self) -> ExpansionConfig {
        self.expansion.clone().with_settings(&self.project)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load the explicit config file, else `./sitegantt.toml` if present, else
/// defaults
pub fn load(explicit: Option<&Path>) -> Result<CliConfig, ConfigError> {
    let local = Path::new(DEFAULT_CONFIG_FILE);
    let path = match explicit {
        Some(path) => path,
        None if local.exists() => local,
        None => {
            debug!("no config file; using defaults");
            return Ok(CliConfig::default());
        }
    };
    load_from(path)
}

pub fn load_from(path: &Path) -> Result<CliConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn parse(text: &str) -> Result<CliConfig, toml::de::Error> {
    toml::from_str(text)
}
