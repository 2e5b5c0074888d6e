//! Error types for trello-sync.
//!
//! Each layer returns its own error; the binary collects them with `anyhow`.

use std::path::PathBuf;

use crate::events::EventKind;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid card id pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Trello REST API errors.
#[derive(Debug, thiserror::Error)]
pub enum TrelloError {
    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Trello returned {status} for {endpoint}: {body}")]
    Status {
        status: u16,
        endpoint: String,
        body: String,
    },

    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl TrelloError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TrelloError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from reading local git history.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git log exited with {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Unparseable git log record: {0}")]
    Parse(String),
}

/// Errors reading the CI event payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Failed to read event file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Event field {field} is invalid: {reason}")]
    InvalidField { field: String, reason: String },
}

/// Errors that abort processing of a single event.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A pull request or issue carries no card reference where one is required.
    #[error("{kind} {url} does not reference a Trello card (checked {checked:?})")]
    MissingCardReference {
        kind: EventKind,
        url: String,
        checked: Vec<String>,
    },
}
