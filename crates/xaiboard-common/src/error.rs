use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XaiboardError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Incomplete response: {0}")]
    IncompleteResponse(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl XaiboardError {
    /// Collapse into the in-band error kind surfaced to the display layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            XaiboardError::Fetch(_) | XaiboardError::Http(_) => ErrorKind::FetchError,
            XaiboardError::Timeout(_) => ErrorKind::Timeout,
            XaiboardError::IncompleteResponse(_) => ErrorKind::IncompleteResponse,
            XaiboardError::MalformedResponse(_)
            | XaiboardError::Serialization(_)
            | XaiboardError::Config(_) => ErrorKind::MalformedResponse,
        }
    }
}

pub type Result<T> = std::result::Result<T, XaiboardError>;

/// Error kinds carried by `RequestState::Failed` and `BootstrapState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    FetchError,
    Timeout,
    IncompleteResponse,
    MalformedResponse,
}

impl ErrorKind {
    /// Short message for inline display.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::FetchError => "The explanation backend could not be reached.",
            ErrorKind::Timeout => "The explanation backend did not answer in time.",
            ErrorKind::IncompleteResponse => "The backend response is missing requested inputs or explainers.",
            ErrorKind::MalformedResponse => "The backend response could not be interpreted.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::FetchError => "fetch_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::IncompleteResponse => "incomplete_response",
            ErrorKind::MalformedResponse => "malformed_response",
        };
        f.write_str(name)
    }
}
