//! Structured-offer parse over `application/ld+json` blocks
//!
//! Blocks may hold a single object, a list of objects, or an object with an
//! `@graph` container. Any object typed as a schema.org Event contributes the
//! `lowPrice`, `highPrice` and `price` of each of its offers.

use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;

use super::{collect_fields, StageMiss, StageResult};

const OFFER_PRICE_KEYS: [&str; 3] = ["lowPrice", "highPrice", "price"];

static LD_JSON_SELECTOR: OnceLock<Selector> = OnceLock::new();

fn ld_json_selector() -> &'static Selector {
    LD_JSON_SELECTOR.get_or_init(|| {
        Selector::parse(r#"script[type="application/ld+json"]"#)
            .expect("Invalid ld+json selector")
    })
}

/// Event or one of its schema.org subtypes (`MusicEvent`, `TheaterEvent`, ...)
fn is_event_type(value: &Value) -> bool {
    let matches = |t: &str| t == "Event" || (t.ends_with("Event") && t.len() > "Event".len());
    match value {
        Value::String(t) => matches(t),
        Value::Array(types) => types.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

/// Flatten a block into its candidate objects
fn candidates(block: &Value) -> Vec<&Value> {
    let roots: Vec<&Value> = match block {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut out = Vec::new();
    for root in roots.into_iter().filter(|r| r.is_object()) {
        match root.get("@graph") {
            Some(Value::Array(graph)) => out.extend(graph.iter().filter(|g| g.is_object())),
            Some(graph @ Value::Object(_)) => out.push(graph),
            _ => out.push(root),
        }
    }
    out
}

fn offer_prices(event: &Value, out: &mut Vec<f64>) {
    let offers: Vec<&Value> = match event.get("offers") {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => return,
    };

    for offer in offers {
        collect_fields(offer, &OFFER_PRICE_KEYS, out);
    }
}

/// Stage 1 of the cascade
pub fn extract(html: &str) -> StageResult {
    let document = Html::parse_document(html);
    let blocks: Vec<String> = document
        .select(ld_json_selector())
        .map(|script| script.text().collect::<String>())
        .collect();

    if blocks.is_empty() {
        return Err(StageMiss::NoStructuredData);
    }

    let mut prices = Vec::new();
    let mut events = 0usize;
    let mut last_parse_error = None;

    for raw in &blocks {
        // One bad block must not hide the others
        let block: Value = match serde_json::from_str(raw.trim()) {
            Ok(v) => v,
            Err(e) => {
                last_parse_error = Some(e.to_string());
                continue;
            }
        };

        for obj in candidates(&block) {
            if obj.get("@type").is_some_and(is_event_type) {
                events += 1;
                offer_prices(obj, &mut prices);
            }
        }
    }

    if !prices.is_empty() {
        return Ok(prices);
    }

    match (events, last_parse_error) {
        (0, Some(err)) => Err(StageMiss::MalformedJson(err)),
        (0, None) => Err(StageMiss::NoEventObjects {
            blocks: blocks.len(),
        }),
        _ => Err(StageMiss::NoOfferPrices),
    }
}
