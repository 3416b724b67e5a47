//! HTTP fetcher implementation
//!
//! This module handles all outbound requests, including:
//! - Building the shared HTTP client
//! - GET requests with a fixed-delay retry policy on non-success statuses
//! - Error classification (transport vs. status)

use crate::config::ScraperConfig;
use crate::{Result, ScrapeError};
use reqwest::{Client, Response};
use std::future::Future;
use std::time::Duration;

/// Ordered backoff delays applied before each re-attempt
///
/// A policy with `n` delays allows at most `n + 1` attempts. An empty policy
/// fails on the first non-success status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// Builds a policy from delays expressed in milliseconds
    pub fn from_millis(delays_ms: &[u64]) -> Self {
        Self::new(delays_ms.iter().copied().map(Duration::from_millis).collect())
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Maximum number of requests one fetch may issue
    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }
}

/// Anything able to turn a URL into a page body
///
/// The scrape engine is generic over this so it can be driven by the real
/// HTTP fetcher or by an in-memory source.
pub trait PageSource: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Builds the HTTP client shared by every fetch
///
/// No custom headers are set; only the timeouts come from configuration.
///
/// # Example
///
/// ```no_run
/// use lang_pulse::config::ScraperConfig;
/// use lang_pulse::scrape::build_http_client;
///
/// let client = build_http_client(&ScraperConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ScraperConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// GET-with-retry fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds a fetcher from the scraper configuration
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        let client = build_http_client(config)?;
        Ok(Self::new(
            client,
            RetryPolicy::from_millis(&config.retry_delays_ms),
        ))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL, retrying on non-success statuses
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Read the body and return it |
    /// | Other status | Sleep the next policy delay and retry |
    /// | Policy exhausted | `ScrapeError::Status` with the last code |
    /// | Connection/DNS/TLS/body error | `ScrapeError::Transport`, no retry |
    ///
    /// Transport failures are deliberately not retried.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    pub async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = self.send(url).await?;
        let mut delays = self.policy.delays().iter();

        while !response.status().is_success() {
            let status = response.status().as_u16();
            let Some(delay) = delays.next() else {
                tracing::error!("Could not access {} after retries (status {})", url, status);
                return Err(ScrapeError::Status {
                    url: url.to_string(),
                    status,
                });
            };

            tracing::warn!(
                "Got status {} from {}, retrying in {}ms",
                status,
                url,
                delay.as_millis()
            );
            // Release the connection before sleeping
            drop(response);
            tokio::time::sleep(*delay).await;
            response = self.send(url).await?;
        }

        tracing::trace!("Reading body of {}", url);
        let body = response.bytes().await.map_err(|source| {
            tracing::error!("Could not read body of {}: {}", url, source);
            ScrapeError::Transport {
                url: url.to_string(),
                source,
            }
        })?;

        Ok(body.to_vec())
    }

    async fn send(&self, url: &str) -> Result<Response> {
        tracing::trace!("Making HTTP request to {}", url);
        self.client.get(url).send().await.map_err(|source| {
            tracing::error!("Could not access {}: {}", url, source);
            ScrapeError::Transport {
                url: url.to_string(),
                source,
            }
        })
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send {
        self.get(url)
    }
}
