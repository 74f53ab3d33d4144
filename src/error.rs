//! Errors raised while loading and rendering device lists.
//!
//! Color conversion itself cannot fail; everything here comes from the
//! device-list source (HTTP, file system, JSON).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure talking to the device list endpoint.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Endpoint answered, but not with a success status.
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid device list url {0:?}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed device details document.
    #[error("invalid device details: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
