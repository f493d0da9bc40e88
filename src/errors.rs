//! Typed error hierarchy for the board.
//!
//! Three enums cover the three layers:
//! - `ServiceError` — REST calls made through a `BoardService`
//! - `ConfigError` — loading and validating `taskboard.toml`
//! - `BoardError` — controller-level failures surfaced to the CLI

use thiserror::Error;

/// Errors from a remote board/group service call.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    /// HTTP status code carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            ServiceError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

/// Errors from the configuration layer.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file at {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse taskboard.toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize taskboard.toml: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid API base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),
}

/// Errors surfaced by the controller to its callers.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("No group selected; pass --group or set board.group_id")]
    MissingGroup,

    #[error("Task {id} not found on the board")]
    TaskNotFound { id: String },

    #[error("Column {id} not found on the board")]
    ColumnNotFound { id: String },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
