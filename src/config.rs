//! Configuration loading
//!
//! Reads `config.toml` from the platform config directory
//! (`~/.config/taskdeck/config.toml` on Linux) or from an explicit path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::TASKS_FILE;
use crate::task::CategoryFilter;

const APP_DIR: &str = "taskdeck";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the task list lives. Defaults to `<data dir>/taskdeck/tasks.json`.
    pub data_file: Option<PathBuf>,
    pub view: ViewConfig,
    pub log: LogConfig,
}

/// Initial state of the list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// `all` or one of the categories.
    pub filter: String,
    pub sort_by_due_date: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            filter: "all".to_string(),
            sort_by_due_date: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    /// Log file for the terminal UI.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Loads configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and a missing file means defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content).map_err(|err| match err {
            Error::InvalidConfig(msg) => Error::InvalidConfig(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parses and validates TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::InvalidConfig(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.view
            .filter
            .parse::<CategoryFilter>()
            .map_err(|_| Error::InvalidConfig(format!("view.filter = {:?}", self.view.filter)))?;
        Ok(())
    }

    pub fn default_filter(&self) -> CategoryFilter {
        self.view.filter.parse().unwrap_or_default()
    }

    /// Task file to use: `cli_override`, then `data_file`, then the platform default.
    pub fn data_file(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = cli_override.or(self.data_file.as_deref()) {
            return Ok(path.to_path_buf());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(TASKS_FILE))
            .ok_or(Error::NoDataDir)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log
            .file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("taskdeck.log"))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
