//! Error types for ip-whitelist.

use std::time::Duration;

use thiserror::Error;

/// Error type for ip-whitelist operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The feed URL could not be turned into a request
    #[error("failed to create request: {0}")]
    RequestBuildFailed(String),

    /// Transport-level failure, including timeouts
    #[error("failed to download data: {0}")]
    DownloadFailed(#[source] TransportError),

    /// Feed server answered with a non-success status
    #[error("received non-200 response: {0}")]
    UnexpectedStatus(u16),

    /// I/O failure while streaming the feed body
    #[error("error reading response: {0}")]
    ReadError(#[source] std::io::Error),

    /// A refresh triggered by a lookup failed at one of its stages
    #[error("failed to download and process data: {0}")]
    RefreshFailed(#[source] Box<Error>),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias for ip-whitelist operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type reported by a [`Transport`](crate::fetch::Transport).
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request deadline elapsed
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Any other connection or protocol failure
    #[error("{0}")]
    Other(String),
}

/// Error type for CIDR validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CidrError {
    /// Invalid CIDR notation
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
}
