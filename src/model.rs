//! Event, track and price-tier data model
//!
//! Records flow through the pipeline as values: each stage takes an
//! `EventRecord` and hands back a new one with one more field populated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A positive price observed on an event page
pub type PriceSample = f64;

/// Four-point ticket price ladder, cheapest (`upper`) to priciest (`vip`)
///
/// Either every tier is present or none are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTierSet {
    pub upper: Option<f64>,
    pub mid: Option<f64>,
    pub floor: Option<f64>,
    pub vip: Option<f64>,
}

impl PriceTierSet {
    /// All four tiers absent
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fully populated ladder
    pub fn new(upper: f64, mid: f64, floor: f64, vip: f64) -> Self {
        Self {
            upper: Some(upper),
            mid: Some(mid),
            floor: Some(floor),
            vip: Some(vip),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upper.is_none() && self.mid.is_none() && self.floor.is_none() && self.vip.is_none()
    }

    /// `vip / upper` when both are known and `upper > 0`
    pub fn spread_ratio(&self) -> Option<f64> {
        match (self.vip, self.upper) {
            (Some(vip), Some(upper)) if upper > 0.0 => Some(vip / upper),
            _ => None,
        }
    }
}

/// Sell-out risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Sort priority, most urgent first
    pub fn priority(&self) -> u8 {
        match self {
            RiskLevel::High => 0,
            RiskLevel::Medium => 1,
            RiskLevel::Low => 2,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::Low => write!(f, "LOW"),
        }
    }
}

/// Free-form fields attached by an external enrichment step.
/// Carried through untouched; nothing in scoring reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
}

impl Annotations {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.tags.is_empty()
            && self.summary.is_none()
            && self.sentiment.is_none()
    }

    /// Fields set on `other` win; the rest keep their current value
    pub fn merged_with(self, other: Annotations) -> Self {
        Self {
            category: other.category.or(self.category),
            tags: if other.tags.is_empty() { self.tags } else { other.tags },
            summary: other.summary.or(self.summary),
            sentiment: other.sentiment.or(self.sentiment),
        }
    }
}

/// Catalog track row; only used to derive artist popularity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub artist: String,
    #[serde(default)]
    pub popularity: Option<f64>,
}

/// One event as it moves through enrichment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub artist: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(flatten)]
    pub tiers: PriceTierSet,
    #[serde(default)]
    pub days_to_event: Option<i64>,
    #[serde(default)]
    pub hype_index: Option<f64>,
    #[serde(default)]
    pub risk: Option<RiskLevel>,
    #[serde(flatten)]
    pub annotations: Annotations,
}

impl EventRecord {
    pub fn new(artist: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            ..Default::default()
        }
    }

    pub fn with_popularity(self, popularity: Option<f64>) -> Self {
        Self { popularity, ..self }
    }

    pub fn with_tiers(self, tiers: PriceTierSet) -> Self {
        Self { tiers, ..self }
    }

    pub fn with_days_to_event(self, days_to_event: Option<i64>) -> Self {
        Self {
            days_to_event,
            ..self
        }
    }

    pub fn with_hype_index(self, hype_index: f64) -> Self {
        Self {
            hype_index: Some(hype_index),
            ..self
        }
    }

    pub fn with_risk(self, risk: RiskLevel) -> Self {
        Self {
            risk: Some(risk),
            ..self
        }
    }

    pub fn with_annotations(self, annotations: Annotations) -> Self {
        Self {
            annotations,
            ..self
        }
    }

    /// Non-empty URL, if the row carries one
    pub fn source_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// One row of the ingested record set, discriminated by its `type` column
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputRow {
    Track(TrackRecord),
    Event(EventRecord),
    #[serde(other)]
    Other,
}
