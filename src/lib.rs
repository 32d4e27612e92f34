//! Tour Hype Library
//!
//! Ticket price tiers, hype index and sell-out risk for upcoming live events.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod ranking;
pub mod scoring;
pub mod tiers;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use model::{EventRecord, PriceTierSet, RiskLevel};
pub use pipeline::{Dataset, Enricher};
