//! HTTP page fetcher with bounded retry
//!
//! Only transient failures (timeouts, refused connections, 429 and 5xx)
//! are retried. Everything else fails on the first attempt.

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::PageFetcher;
use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// Fetches event pages over HTTP(S)
pub struct HttpPageFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpPageFetcher {
    /// Create a new fetcher
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.config.retry_base_delay_ms),
            max_interval: Duration::from_millis(self.config.retry_base_delay_ms * 4),
            max_elapsed_time: Some(Duration::from_millis(self.config.retry_max_elapsed_ms)),
            ..Default::default()
        }
    }

    /// Single attempt
    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }

    fn classify(&self, e: reqwest::Error) -> Error {
        match Error::from(e) {
            Error::FetchTimeout(_) => Error::FetchTimeout(self.config.timeout_ms),
            other => other,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let attempts = AtomicU32::new(0);
        let max_attempts = self.config.max_retries + 1;

        retry(self.backoff(), || async {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            match self.fetch_once(url).await {
                Ok(body) => Ok(body),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!("Retryable fetch error ({}/{}) for {}: {}", attempt, max_attempts, url, e);
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
    }
}
