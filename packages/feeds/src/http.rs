//! HTTP client wrapper for fetching upstream feeds.
//!
//! One request per edition, no retries: a failed fetch fails the run.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::{DEFAULT_MAX_RESPONSE_SIZE, HTTP_TIMEOUT_SECS};
use crate::error::{FeedError, Result};
use crate::pipeline::FeedSource;

/// User agent string identifying this republisher.
const USER_AGENT: &str = concat!("bbc-feeds/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
///
/// # Arguments
/// * `timeout` - Whole-request timeout
///
/// # Returns
/// A `reqwest::blocking::Client` configured with the timeout and user agent.
pub fn create_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Download content from a URL.
///
/// Non-success statuses are errors. Bodies larger than `max_size` are
/// refused, using `Content-Length` up front when the server sends it.
///
/// # Returns
/// Raw bytes of the response body
pub fn download_bytes(client: &Client, url: &str, max_size: u64) -> Result<Vec<u8>> {
    let response = client.get(url).send()?.error_for_status()?;

    if let Some(length) = response.content_length() {
        if length > max_size {
            return Err(FeedError::ResponseTooLarge {
                url: url.to_string(),
                size: length,
                limit: max_size,
            });
        }
    }

    let bytes = response.bytes()?;
    let size = bytes.len() as u64;
    if size > max_size {
        return Err(FeedError::ResponseTooLarge {
            url: url.to_string(),
            size,
            limit: max_size,
        });
    }

    tracing::debug!(url, size, "Downloaded");
    Ok(bytes.to_vec())
}

/// Decode a response body as UTF-8, replacing invalid sequences.
pub fn bytes_to_string(bytes: &[u8], context: &str) -> String {
    match String::from_utf8(bytes.to_vec()) {
        Ok(text) => text,
        Err(_) => {
            tracing::warn!(context, "Response is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Fetches feeds over HTTP.
pub struct HttpFetcher {
    client: Client,
    max_size: u64,
}

impl HttpFetcher {
    /// Create a fetcher with the given timeout and response size limit.
    pub fn new(timeout: Duration, max_size: u64) -> Result<Self> {
        Ok(Self {
            client: create_client(timeout)?,
            max_size,
        })
    }

    /// Create a fetcher with the default timeout and size limit.
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            Duration::from_secs(HTTP_TIMEOUT_SECS),
            DEFAULT_MAX_RESPONSE_SIZE,
        )
    }
}

impl FeedSource for HttpFetcher {
    fn fetch(&self, edition: &str, url: &str) -> Result<String> {
        let bytes = download_bytes(&self.client, url, self.max_size).map_err(|e| {
            if let FeedError::Http(source) = e {
                FeedError::Fetch {
                    edition: edition.to_string(),
                    url: url.to_string(),
                    source,
                }
            } else {
                e
            }
        })?;

        Ok(bytes_to_string(&bytes, &format!("feed for edition {edition}")))
    }
}
