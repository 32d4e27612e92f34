//! Scoring: day offsets, hype index and sell-out risk
//!
//! Each stage is a pure function of an `EventRecord`'s already-populated
//! fields, so the same record always scores the same way.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::EventRecord;

pub mod hype;
pub mod risk;
pub mod temporal;

pub use hype::{HypeComponents, HypeWeights};
pub use risk::{spread_signal, RiskThresholds};
pub use temporal::{days_until, parse_event_datetime};

/// Scoring configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: HypeWeights,
    #[serde(default)]
    pub thresholds: RiskThresholds,
}

/// Fill in day offset, hype index and risk label
pub fn score_event(event: EventRecord, config: &ScoringConfig, today: NaiveDate) -> EventRecord {
    let days = event.date.as_deref().and_then(|d| days_until(d, today));
    let event = event.with_days_to_event(days);

    let hype = config
        .weights
        .hype_index(event.popularity, &event.tiers, event.days_to_event);
    let event = event.with_hype_index(hype);

    let risk = config
        .thresholds
        .classify(hype, spread_signal(&event.tiers), event.days_to_event);
    event.with_risk(risk)
}
