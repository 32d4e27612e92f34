//! Sell-out risk classification
//!
//! Stateless: the label depends only on `(hype, spread, days)`.

use serde::Deserialize;

use crate::model::{PriceTierSet, RiskLevel};

/// Cutoffs for the HIGH / MEDIUM labels
#[derive(Debug, Clone, Deserialize)]
pub struct RiskThresholds {
    /// Minimum hype for HIGH (also needs wide spread or an imminent date)
    #[serde(default = "default_high_hype")]
    pub high_hype: f64,
    /// Minimum hype for MEDIUM
    #[serde(default = "default_medium_hype")]
    pub medium_hype: f64,
    /// `vip/upper` ratio counted as premium pricing
    #[serde(default = "default_high_spread")]
    pub high_spread: f64,
    /// Events this many days out or fewer count as "soon"
    #[serde(default = "default_soon_days")]
    pub soon_days: i64,
}

fn default_high_hype() -> f64 { 80.0 }
fn default_medium_hype() -> f64 { 60.0 }
fn default_high_spread() -> f64 { 3.0 }
fn default_soon_days() -> i64 { 21 }

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_hype: default_high_hype(),
            medium_hype: default_medium_hype(),
            high_spread: default_high_spread(),
            soon_days: default_soon_days(),
        }
    }
}

/// Spread signal for classification; `1.0` (flat pricing) when unknown
pub fn spread_signal(tiers: &PriceTierSet) -> f64 {
    tiers.spread_ratio().unwrap_or(1.0)
}

impl RiskThresholds {
    pub fn classify(&self, hype: f64, spread: f64, days: Option<i64>) -> RiskLevel {
        let soon = days.is_some_and(|d| d <= self.soon_days);

        if hype >= self.high_hype && (spread >= self.high_spread || soon) {
            RiskLevel::High
        } else if hype >= self.medium_hype {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_needs_spread_or_soon() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(85.0, 3.0, Some(90)), RiskLevel::High);
        assert_eq!(t.classify(85.0, 1.5, Some(21)), RiskLevel::High);
        // Hot but neither premium nor imminent
        assert_eq!(t.classify(85.0, 1.5, Some(22)), RiskLevel::Medium);
        assert_eq!(t.classify(85.0, 1.5, None), RiskLevel::Medium);
    }

    #[test]
    fn test_medium_and_low() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(60.0, 1.0, None), RiskLevel::Medium);
        assert_eq!(t.classify(59.99, 10.0, Some(1)), RiskLevel::Low);
        assert_eq!(t.classify(0.0, 1.0, None), RiskLevel::Low);
    }

    #[test]
    fn test_reference_example_is_high() {
        let t = RiskThresholds::default();
        let tiers = PriceTierSet::new(30.0, 60.0, 90.0, 120.0);
        assert_eq!(t.classify(80.83, spread_signal(&tiers), Some(10)), RiskLevel::High);
    }

    #[test]
    fn test_unknown_spread_is_flat() {
        assert_eq!(spread_signal(&PriceTierSet::empty()), 1.0);
    }

    #[test]
    fn test_deterministic() {
        let t = RiskThresholds::default();
        let inputs = [(81.0, 2.0, Some(5)), (70.0, 4.0, None), (10.0, 1.0, Some(-2))];
        for (hype, spread, days) in inputs {
            let first = t.classify(hype, spread, days);
            for _ in 0..10 {
                assert_eq!(t.classify(hype, spread, days), first);
            }
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let t = RiskThresholds {
            high_hype: 70.0,
            medium_hype: 40.0,
            high_spread: 3.0,
            soon_days: 14,
        };
        assert_eq!(t.classify(72.0, 1.0, Some(14)), RiskLevel::High);
        assert_eq!(t.classify(72.0, 1.0, Some(15)), RiskLevel::Medium);
        assert_eq!(t.classify(45.0, 1.0, None), RiskLevel::Medium);
    }
}
