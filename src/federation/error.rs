//! Federation error types

use thiserror::Error;

/// Errors raised while resolving a federation
#[derive(Debug, Error)]
pub enum FederationError {
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Invalid document at {url}: {reason}")]
    InvalidDocument { url: String, reason: String },

    #[error("Failed to load manifest from {url}: {reason}")]
    ManifestFetch { url: String, reason: String },

    #[error("Failed to load host metadata from {url}: {reason}")]
    HostFetch { url: String, reason: String },

    #[error("Error loading remote entry for {remote} from file {url}: {reason}")]
    RemoteFetch {
        remote: String,
        url: String,
        reason: String,
    },

    #[error("Failed to install import map: {0}")]
    Install(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FederationError>;

impl From<reqwest::Error> for FederationError {
    fn from(e: reqwest::Error) -> Self {
        FederationError::Fetch {
            url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            reason: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for FederationError {
    fn from(e: serde_json::Error) -> Self {
        FederationError::InvalidDocument {
            url: String::new(),
            reason: e.to_string(),
        }
    }
}

impl From<std::io::Error> for FederationError {
    fn from(e: std::io::Error) -> Self {
        FederationError::Install(e.to_string())
    }
}
