//! Price extraction from raw event-page markup
//!
//! Three strategies run in order, each only if the previous found nothing:
//!
//! 1. [`jsonld`] - schema.org `Event` offers in `application/ld+json` blocks
//! 2. [`inline`] - an inline `"priceRanges": [...]` literal
//! 3. [`text`]   - price-looking numbers in the raw text
//!
//! Stages report a [`StageMiss`] instead of failing. [`extract_prices`] is the
//! only place that turns misses into "no samples"; it never errors.

use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::model::PriceSample;

pub mod inline;
pub mod jsonld;
pub mod text;

/// Outcome of a single extraction stage
pub type StageResult = std::result::Result<Vec<PriceSample>, StageMiss>;

/// Why a stage produced no samples
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageMiss {
    #[error("no structured-data blocks")]
    NoStructuredData,

    #[error("no Event objects in {blocks} structured-data block(s)")]
    NoEventObjects { blocks: usize },

    #[error("events carried no usable offer prices")]
    NoOfferPrices,

    #[error("no priceRanges literal")]
    NoPriceRanges,

    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("no price-like tokens")]
    NoMatch,
}

/// Which stage of the cascade produced the samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    StructuredOffers,
    InlinePriceRanges,
    TextScan,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::StructuredOffers => write!(f, "structured offers"),
            Strategy::InlinePriceRanges => write!(f, "inline priceRanges"),
            Strategy::TextScan => write!(f, "text scan"),
        }
    }
}

/// Full cascade trace, used by diagnostics
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Stage that produced the samples, if any did
    pub strategy: Option<Strategy>,
    pub samples: Vec<PriceSample>,
    /// Misses from the stages that ran before the winner (or all of them)
    pub misses: Vec<(Strategy, StageMiss)>,
}

const CASCADE: [(Strategy, fn(&str) -> StageResult); 3] = [
    (Strategy::StructuredOffers, jsonld::extract),
    (Strategy::InlinePriceRanges, inline::extract),
    (Strategy::TextScan, text::extract),
];

/// Run the cascade and keep the trace
pub fn extract_with_report(html: &str) -> ExtractionReport {
    let mut report = ExtractionReport::default();

    for (strategy, stage) in CASCADE {
        match stage(html) {
            Ok(samples) if !samples.is_empty() => {
                debug!("{} yielded {} price samples", strategy, samples.len());
                report.strategy = Some(strategy);
                report.samples = samples;
                return report;
            }
            Ok(_) => report.misses.push((strategy, StageMiss::NoMatch)),
            Err(miss) => {
                debug!("{} missed: {}", strategy, miss);
                report.misses.push((strategy, miss));
            }
        }
    }

    report
}

/// Extract positive price samples from page markup; empty when nothing is found
pub fn extract_prices(html: &str) -> Vec<PriceSample> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    extract_with_report(html).samples
}

/// Coerce a JSON price value to a positive float.
///
/// Numbers pass through; strings lose a leading currency symbol and
/// thousands separators before parsing.
pub fn coerce_price(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }?;

    (parsed.is_finite() && parsed > 0.0).then_some(parsed)
}

/// Parse a textual price such as `"$1,250.00"` or `" 89.5 "`
pub fn parse_price_text(raw: &str) -> Option<f64> {
    let trimmed = raw
        .trim()
        .trim_start_matches(|c: char| matches!(c, '$' | '€' | '£' | '¥'))
        .trim();
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok()
}

/// Read the first coercible value under each key, in order
pub(crate) fn collect_fields(obj: &Value, keys: &[&str], out: &mut Vec<PriceSample>) {
    for key in keys {
        if let Some(price) = obj.get(*key).and_then(coerce_price) {
            out.push(price);
        }
    }
}
