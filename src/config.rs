//! Layered configuration for the board client.
//!
//! Settings are read from `.taskboard/taskboard.toml` in the project
//! directory (falling back to the user config directory), then overridden by
//! environment variables, then by CLI flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8080"
//! token = "secret"
//! timeout_secs = 30
//!
//! [board]
//! group_id = "42"
//! columns = ["todo", "inprogress", "review", "done"]
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! | Variable            | Overrides       |
//! |---------------------|-----------------|
//! | `TASKBOARD_API_URL` | `api.base_url`  |
//! | `TASKBOARD_TOKEN`   | `api.token`     |
//! | `TASKBOARD_GROUP`   | `board.group_id`|

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

pub const CONFIG_DIR: &str = ".taskboard";
pub const CONFIG_FILE: &str = "taskboard.toml";

/// REST endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which board to open and how to lay it out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSection {
    #[serde(default)]
    pub group_id: Option<String>,
    /// Columns to show, in order. Empty means every column the server returns.
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Contents of `taskboard.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskboardConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub board: BoardSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl TaskboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `<project_dir>/.taskboard/taskboard.toml`, then the user
    /// config directory, else defaults.
    pub fn load_or_default(project_dir: &Path) -> Result<Self, ConfigError> {
        match Self::locate(project_dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// First existing config file, project-level before user-level.
    pub fn locate(project_dir: &Path) -> Option<PathBuf> {
        let project = project_config_path(project_dir);
        if project.exists() {
            return Some(project);
        }
        dirs::config_dir()
            .map(|dir| dir.join("taskboard").join(CONFIG_FILE))
            .filter(|path| path.exists())
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `TASKBOARD_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("TASKBOARD_API_URL").filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup("TASKBOARD_TOKEN").filter(|v| !v.is_empty()) {
            self.api.token = Some(token);
        }
        if let Some(group) = lookup("TASKBOARD_GROUP").filter(|v| !v.is_empty()) {
            self.board.group_id = Some(group);
        }
    }

    /// Hard errors that make the config unusable.
    pub fn check(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(url.to_string()));
        }
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Err(e) = self.check() {
            warnings.push(e.to_string());
        }
        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0; every request will time out".to_string());
        }
        if self.board.group_id.is_none() {
            warnings.push("board.group_id is not set; pass --group on every command".to_string());
        }

        let mut seen = HashSet::new();
        for col in &self.board.columns {
            if col.trim().is_empty() {
                warnings.push("board.columns contains an empty column id".to_string());
            } else if !seen.insert(col.as_str()) {
                warnings.push(format!("board.columns lists '{}' more than once", col));
            }
        }

        let directive = crate::logging::level_directive(&self.logging.level);
        if tracing_subscriber::EnvFilter::try_new(&directive).is_err() {
            warnings.push(format!(
                "Invalid logging.level '{}': expected a tracing filter such as 'info' or 'taskboard=debug'",
                self.logging.level
            ));
        }

        warnings
    }
}

pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_DIR).join(CONFIG_FILE)
}
