//! Inline `"priceRanges": [...]` literal fallback
//!
//! Ticketing pages often ship their state as a JS object literal rather than
//! ld+json. The array is cut out with a regex and parsed as JSON.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::{collect_fields, StageMiss, StageResult};

const RANGE_PRICE_KEYS: [&str; 5] = ["min", "max", "minPrice", "maxPrice", "price"];

static PRICE_RANGES: OnceLock<Regex> = OnceLock::new();

fn price_ranges() -> &'static Regex {
    PRICE_RANGES.get_or_init(|| {
        Regex::new(r#""priceRanges"\s*:\s*(\[[^\]]+\])"#).expect("Invalid priceRanges regex")
    })
}

/// Stage 2 of the cascade
pub fn extract(html: &str) -> StageResult {
    let literal = price_ranges()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or(StageMiss::NoPriceRanges)?;

    let ranges: Vec<Value> = serde_json::from_str(literal.as_str())
        .map_err(|e| StageMiss::MalformedJson(e.to_string()))?;

    let mut prices = Vec::new();
    for range in ranges.iter().filter(|r| r.is_object()) {
        collect_fields(range, &RANGE_PRICE_KEYS, &mut prices);
    }

    if prices.is_empty() {
        Err(StageMiss::NoMatch)
    } else {
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_pairs() {
        let html = r#"var s = {"id":"x","priceRanges": [{"type":"standard","currency":"USD","min":49.5,"max":189.0},{"type":"vip","min":"$350","max":"1,100"}]};"#;
        assert_eq!(extract(html), Ok(vec![49.5, 189.0, 350.0, 1100.0]));
    }

    #[test]
    fn test_alternate_key_names() {
        let html = r#"{"priceRanges":[{"minPrice":25,"maxPrice":80},{"price":"40.00"}]}"#;
        assert_eq!(extract(html), Ok(vec![25.0, 80.0, 40.0]));
    }

    #[test]
    fn test_misses() {
        assert_eq!(extract("<html></html>"), Err(StageMiss::NoPriceRanges));
        assert!(matches!(
            extract(r#""priceRanges": [{min: 10}]"#),
            Err(StageMiss::MalformedJson(_))
        ));
        assert_eq!(
            extract(r#""priceRanges": [{"currency":"USD"}]"#),
            Err(StageMiss::NoMatch)
        );
    }
}
