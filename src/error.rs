use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Client-side input problems, reported before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Code is required")]
    CodeRequired,
    #[error("Filename is required")]
    FilenameRequired,
    #[error("ZIP file is required")]
    ZipRequired,
    #[error("ZIP upload must be a regular file")]
    ZipNotAFile,
    #[error("ZIP file too large (max {max_mb}MB)")]
    ZipTooLarge { max_mb: u64 },
    #[error("Must be a GitHub URL")]
    NotGithubUrl,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid review service URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} timed out after {}s", after.as_secs())]
    TimedOut {
        operation: &'static str,
        after: Duration,
    },
    #[error("review service returned an unusable session id {session_id:?}")]
    InvalidSessionId { session_id: String },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("review service rejected the request ({status})")]
    Rejected { status: u16, message: Option<String> },
    #[error("unexpected response from {endpoint}: HTTP {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("response from {endpoint} is missing `{field}`")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ServiceError {
    /// Message to show the user: the service's own explanation when it gave
    /// one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ServiceError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ServiceError::Rejected { .. } => fallback.to_string(),
            ServiceError::Io { .. } => self.to_string(),
            other => format!("{}: {}", fallback, other),
        }
    }
}
