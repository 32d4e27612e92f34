//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// Re-export scoring configs
pub use crate::scoring::{HypeWeights, RiskThresholds, ScoringConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub data: DataConfig,
}

/// Event page fetching
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Base for relative event URLs
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Single request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Whole-page budget, retries included; past it the event has no prices
    #[serde(default = "default_page_budget_ms")]
    pub page_budget_ms: u64,
    /// Extra attempts after the first, transient failures only
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_elapsed_ms")]
    pub retry_max_elapsed_ms: u64,
    /// Pages fetched at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn page_budget(&self) -> Duration {
        Duration::from_millis(self.page_budget_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            page_budget_ms: default_page_budget_ms(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_elapsed_ms: default_retry_max_elapsed_ms(),
            concurrency: default_concurrency(),
        }
    }
}

/// Input / output locations
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_raw_dir")]
    pub raw_dir: String,
    #[serde(default = "default_enriched_dir")]
    pub enriched_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            enriched_dir: default_enriched_dir(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.ticketmaster.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_page_budget_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    250
}

fn default_retry_max_elapsed_ms() -> u64 {
    5_000
}

fn default_concurrency() -> usize {
    4
}

fn default_raw_dir() -> String {
    "data/raw".to_string()
}

fn default_enriched_dir() -> String {
    "data/enriched".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("fetch.base_url", default_base_url())?
            .set_default("fetch.timeout_ms", default_timeout_ms() as i64)?
            .set_default("fetch.concurrency", default_concurrency() as i64)?
            .set_default("data.raw_dir", default_raw_dir())?
            .set_default("data.enriched_dir", default_enriched_dir())?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix HYPE__)
            .add_source(
                config::Environment::with_prefix("HYPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.fetch.base_url)
            .with_context(|| format!("Invalid fetch.base_url: {}", self.fetch.base_url))?;

        if self.fetch.timeout_ms == 0 {
            anyhow::bail!("fetch.timeout_ms must be positive");
        }

        if self.fetch.page_budget_ms < self.fetch.timeout_ms {
            anyhow::bail!(
                "fetch.page_budget_ms ({}) must be at least fetch.timeout_ms ({})",
                self.fetch.page_budget_ms,
                self.fetch.timeout_ms
            );
        }

        if self.fetch.concurrency == 0 {
            anyhow::bail!("fetch.concurrency must be at least 1");
        }

        let w = &self.scoring.weights;
        for (name, value) in [
            ("popularity", w.popularity),
            ("spread", w.spread),
            ("recency", w.recency),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("scoring.weights.{} must be within [0, 1], got {}", name, value);
            }
        }

        let total = w.popularity + w.spread + w.recency;
        if (total - 1.0).abs() > 1e-6 {
            anyhow::bail!("hype weights must sum to 1.0, got {}", total);
        }

        if w.spread_divisor <= 0.0 {
            anyhow::bail!("scoring.weights.spread_divisor must be positive");
        }

        if w.recency_horizon_days <= 0.0 {
            anyhow::bail!("scoring.weights.recency_horizon_days must be positive");
        }

        let t = &self.scoring.thresholds;
        if t.medium_hype > t.high_hype {
            anyhow::bail!(
                "medium_hype ({}) cannot exceed high_hype ({})",
                t.medium_hype,
                t.high_hype
            );
        }

        if t.high_spread < 1.0 {
            tracing::warn!(
                "high_spread {} is below 1.0 - every priced event will count as premium",
                t.high_spread
            );
        }

        Ok(())
    }

    /// Configuration summary for display
    pub fn masked_display(&self) -> String {
        let w = &self.scoring.weights;
        let t = &self.scoring.thresholds;
        format!(
            r#"Configuration:
  Fetch:
    base_url: {}
    user_agent: {}
    timeout: {}ms (page budget {}ms)
    retries: {} (base delay {}ms, max elapsed {}ms)
    concurrency: {}
  Hype weights:
    popularity: {}
    spread: {} (saturates at vip/upper - 1 = {})
    recency: {} (horizon {} days, neutral {})
  Risk thresholds:
    high: hype >= {} and (spread >= {} or days <= {})
    medium: hype >= {}
  Data:
    raw_dir: {}
    enriched_dir: {}
"#,
            mask_url(&self.fetch.base_url),
            self.fetch.user_agent,
            self.fetch.timeout_ms,
            self.fetch.page_budget_ms,
            self.fetch.max_retries,
            self.fetch.retry_base_delay_ms,
            self.fetch.retry_max_elapsed_ms,
            self.fetch.concurrency,
            w.popularity,
            w.spread,
            w.spread_divisor,
            w.recency,
            w.recency_horizon_days,
            w.neutral_recency,
            t.high_hype,
            t.high_spread,
            t.soon_days,
            t.medium_hype,
            self.data.raw_dir,
            self.data.enriched_dir,
        )
    }
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fetch.concurrency, 4);
        assert_eq!(config.scoring.thresholds.high_hype, 80.0);
        assert_eq!(config.scoring.thresholds.soon_days, 21);
        assert_eq!(config.scoring.weights.recency_horizon_days, 120.0);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("definitely-not-here.toml").unwrap();
        assert_eq!(config.fetch.timeout_ms, 15_000);
        assert_eq!(config.data.enriched_dir, "data/enriched");
    }

    #[test]
    fn test_load_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hype.toml");
        std::fs::write(
            &path,
            r#"
[fetch]
concurrency = 8

[scoring.thresholds]
high_hype = 70.0
medium_hype = 40.0
soon_days = 14
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.fetch.concurrency, 8);
        assert_eq!(config.scoring.thresholds.high_hype, 70.0);
        assert_eq!(config.scoring.thresholds.soon_days, 14);
        // Untouched keys keep defaults
        assert_eq!(config.scoring.thresholds.high_spread, 3.0);
        assert_eq!(config.scoring.weights.popularity, 0.5);
    }

    #[test]
    fn test_rejects_unbalanced_weights() {
        let mut config = Config::default();
        config.scoring.weights.spread = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.scoring.thresholds.medium_hype = 90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mask_url() {
        assert_eq!(
            mask_url("https://api.example.com?key=secret"),
            "https://api.example.com?***"
        );
        assert_eq!(mask_url("https://api.example.com"), "https://api.example.com");
    }
}
