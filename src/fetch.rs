//! Feed download over an injectable HTTP transport.
//!
//! [`FeedFetcher`] builds one GET request per call and hands it to a
//! [`Transport`]. Production code uses [`HttpTransport`], backed by a blocking
//! `reqwest` client; tests plug in canned responses.

use std::io::Read;
use std::time::Duration;

use reqwest::Url;

use crate::error::{Error, Result, TransportError};

/// Default feed URL (RIPE NCC delegated statistics, extended format).
pub const DEFAULT_FEED_URL: &str =
    "https://ftp.ripe.net/ripe/stats/delegated-ripencc-extended-latest";

/// Deadline for a single feed download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// A GET request for the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    /// Absolute URL to fetch
    pub url: Url,
    /// Deadline for the whole exchange, body included
    pub timeout: Duration,
}

/// Response returned by a [`Transport`].
pub struct FeedResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, read to the end by the caller
    pub body: Box<dyn Read + Send>,
}

impl FeedResponse {
    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Narrow "perform a request, get a response" capability.
pub trait Transport: Send + Sync {
    /// Execute a request. A non-success status is not an error at this level.
    fn execute(&self, request: &FeedRequest) -> std::result::Result<FeedResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest::blocking`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport with a fresh client.
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("ip-whitelist/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &FeedRequest) -> std::result::Result<FeedResponse, TransportError> {
        let response = self
            .client
            .get(request.url.clone())
            .timeout(request.timeout)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(request.timeout)
                } else {
                    TransportError::Other(e.to_string())
                }
            })?;

        Ok(FeedResponse {
            status: response.status().as_u16(),
            body: Box::new(response),
        })
    }
}

/// Downloads the allocation feed through a [`Transport`].
pub struct FeedFetcher<T> {
    transport: T,
    url: String,
    timeout: Duration,
}

impl<T: Transport> FeedFetcher<T> {
    /// Create a fetcher for the default RIPE NCC feed.
    pub fn new(transport: T) -> Self {
        Self::with_url(transport, DEFAULT_FEED_URL)
    }

    /// Create a fetcher for a custom feed URL.
    ///
    /// The URL is validated on every [`fetch`](Self::fetch), not here.
    pub fn with_url(transport: T, url: &str) -> Self {
        Self {
            transport,
            url: url.to_string(),
            timeout: DOWNLOAD_TIMEOUT,
        }
    }

    /// Override the download deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the feed URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the download deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the feed request.
    pub fn request(&self) -> Result<FeedRequest> {
        let url = Url::parse(&self.url)
            .map_err(|e| Error::RequestBuildFailed(format!("{}: {}", self.url, e)))?;
        Ok(FeedRequest {
            url,
            timeout: self.timeout,
        })
    }

    /// Download the feed. Single attempt, no retries.
    ///
    /// Returns the response body on a 2xx status. Any other status is
    /// reported as [`Error::UnexpectedStatus`] without reading the body.
    pub fn fetch(&self) -> Result<Box<dyn Read + Send>> {
        let request = self.request()?;
        let response = self
            .transport
            .execute(&request)
            .map_err(Error::DownloadFailed)?;

        if !response.is_success() {
            return Err(Error::UnexpectedStatus(response.status));
        }

        Ok(response.body)
    }
}
