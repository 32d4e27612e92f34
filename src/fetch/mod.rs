//! Event page retrieval
//!
//! [`PageFetcher`] is the seam to the network. [`HttpPageFetcher`] is the
//! real implementation; [`PriceCache`] sits in front of any fetcher and
//! guarantees one fetch-and-extract per distinct URL per run.

use async_trait::async_trait;
use url::Url;

use crate::error::{Error, Result};

pub mod cache;
pub mod http;

pub use cache::{CacheStats, PriceCache};
pub use http::HttpPageFetcher;

/// Source of raw page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body for an absolute URL
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Resolve a possibly relative event URL and strip query and fragment
pub fn normalize_url(raw: &str, base: &str) -> Result<String> {
    let raw = raw.trim();
    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(base).map_err(|e| Error::InvalidUrl(format!("{}: {}", base, e)))?;
            base.join(raw)
                .map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?
        }
        Err(e) => return Err(Error::InvalidUrl(format!("{}: {}", raw, e))),
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!("unsupported scheme: {}", raw)));
    }

    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory fetcher for tests

    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone)]
    pub enum FakePage {
        Body(String),
        Status(u16),
        Hang,
    }

    #[derive(Default)]
    pub struct FakeFetcher {
        pages: HashMap<String, FakePage>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), FakePage::Body(body.to_string()));
            self
        }

        pub fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), FakePage::Status(status));
            self
        }

        pub fn hang(mut self, url: &str) -> Self {
            self.pages.insert(url.to_string(), FakePage::Hang);
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.pages.get(url) {
                Some(FakePage::Body(body)) => Ok(body.clone()),
                Some(FakePage::Status(status)) => Err(Error::HttpStatus {
                    url: url.to_string(),
                    status: *status,
                }),
                Some(FakePage::Hang) => std::future::pending::<Result<String>>().await,
                None => Err(Error::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.ticketmaster.com";

    #[test]
    fn test_relative_urls_resolve_against_base() {
        assert_eq!(
            normalize_url("/muse-tickets/event/0B00", BASE).unwrap(),
            "https://www.ticketmaster.com/muse-tickets/event/0B00"
        );
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        assert_eq!(
            normalize_url("https://example.com/event/1?ref=search&utm=x#seats", BASE).unwrap(),
            "https://example.com/event/1"
        );
    }

    #[test]
    fn test_rejects_non_http() {
        assert!(normalize_url("mailto:tickets@example.com", BASE).is_err());
        assert!(normalize_url("/event/1", "not a base").is_err());
    }
}
