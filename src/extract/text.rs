//! Last-resort textual scan for price-looking numbers
//!
//! Keyword-anchored matches (`price`, `min`, `max` followed closely by a
//! number) are preferred; only when none exist does any currency-prefixed
//! number in the document count.

use regex::Regex;
use std::sync::OnceLock;

use super::{parse_price_text, StageMiss, StageResult};

static KEYWORD_PRICE: OnceLock<Regex> = OnceLock::new();
static CURRENCY_PRICE: OnceLock<Regex> = OnceLock::new();

fn keyword_price() -> &'static Regex {
    KEYWORD_PRICE.get_or_init(|| {
        Regex::new(r"(?i)(price|min|max)\D{0,12}\$?\s*([0-9]+(?:\.[0-9]{1,2})?)")
            .expect("Invalid keyword price regex")
    })
}

fn currency_price() -> &'static Regex {
    CURRENCY_PRICE.get_or_init(|| {
        Regex::new(r"[$€£]\s?([0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]{1,2})?|[0-9]+(?:\.[0-9]{1,2})?)")
            .expect("Invalid currency price regex")
    })
}

fn scan(re: &Regex, group: usize, html: &str) -> Vec<f64> {
    re.captures_iter(html)
        .filter_map(|caps| caps.get(group))
        .filter_map(|m| parse_price_text(m.as_str()))
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect()
}

/// Stage 3 of the cascade
pub fn extract(html: &str) -> StageResult {
    let anchored = scan(keyword_price(), 2, html);
    if !anchored.is_empty() {
        return Ok(anchored);
    }

    let bare = scan(currency_price(), 1, html);
    if bare.is_empty() {
        Err(StageMiss::NoMatch)
    } else {
        Ok(bare)
    }
}
