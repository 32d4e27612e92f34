//! Hype index: bounded blend of popularity, price spread and recency
//!
//! `hype = 100 * (w_pop * popularity + w_spread * spread + w_recency * recency)`
//! with every component in `[0, 1]`. Unknown dates score a neutral recency
//! instead of zero so missing data is not read as "far away".

use serde::Deserialize;

use crate::model::PriceTierSet;
use crate::tiers::round2;

/// Weights and shape constants for the hype blend
#[derive(Debug, Clone, Deserialize)]
pub struct HypeWeights {
    #[serde(default = "default_popularity_weight")]
    pub popularity: f64,
    #[serde(default = "default_spread_weight")]
    pub spread: f64,
    #[serde(default = "default_recency_weight")]
    pub recency: f64,
    /// `vip/upper - 1` at which the spread component saturates
    #[serde(default = "default_spread_divisor")]
    pub spread_divisor: f64,
    /// Days out at which recency reaches zero
    #[serde(default = "default_recency_horizon_days")]
    pub recency_horizon_days: f64,
    /// Recency used when the date is unknown or already past
    #[serde(default = "default_neutral_recency")]
    pub neutral_recency: f64,
}

fn default_popularity_weight() -> f64 { 0.5 }
fn default_spread_weight() -> f64 { 0.3 }
fn default_recency_weight() -> f64 { 0.2 }
fn default_spread_divisor() -> f64 { 4.0 }
fn default_recency_horizon_days() -> f64 { 120.0 }
fn default_neutral_recency() -> f64 { 0.5 }

impl Default for HypeWeights {
    fn default() -> Self {
        Self {
            popularity: default_popularity_weight(),
            spread: default_spread_weight(),
            recency: default_recency_weight(),
            spread_divisor: default_spread_divisor(),
            recency_horizon_days: default_recency_horizon_days(),
            neutral_recency: default_neutral_recency(),
        }
    }
}

/// Individual normalized components, kept for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypeComponents {
    pub popularity: f64,
    pub spread: f64,
    pub recency: f64,
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

impl HypeWeights {
    /// Normalize each signal to `[0, 1]`
    pub fn components(
        &self,
        popularity: Option<f64>,
        tiers: &PriceTierSet,
        days: Option<i64>,
    ) -> HypeComponents {
        let popularity = popularity.map(|p| clamp01(p / 100.0)).unwrap_or(0.0);

        let spread = tiers
            .spread_ratio()
            .map(|ratio| clamp01((ratio - 1.0) / self.spread_divisor))
            .unwrap_or(0.0);

        let recency = match days {
            Some(d) if d >= 0 => clamp01(1.0 - d as f64 / self.recency_horizon_days),
            _ => clamp01(self.neutral_recency),
        };

        HypeComponents {
            popularity,
            spread,
            recency,
        }
    }

    /// Hype index in `[0, 100]`, rounded to two decimals
    pub fn hype_index(&self, popularity: Option<f64>, tiers: &PriceTierSet, days: Option<i64>) -> f64 {
        let c = self.components(popularity, tiers, days);
        let blended =
            self.popularity * c.popularity + self.spread * c.spread + self.recency * c.recency;
        round2(100.0 * clamp01(blended))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_example() {
        let weights = HypeWeights::default();
        let tiers = PriceTierSet::new(30.0, 60.0, 90.0, 120.0);

        let c = weights.components(Some(80.0), &tiers, Some(10));
        assert!((c.popularity - 0.8).abs() < 1e-12);
        assert!((c.spread - 0.75).abs() < 1e-12);
        assert!((c.recency - (1.0 - 10.0 / 120.0)).abs() < 1e-12);

        assert_eq!(weights.hype_index(Some(80.0), &tiers, Some(10)), 80.83);
    }

    #[test]
    fn test_missing_everything_uses_neutral_recency() {
        let weights = HypeWeights::default();
        // Only 0.2 * 0.5 survives
        assert_eq!(weights.hype_index(None, &PriceTierSet::empty(), None), 10.0);
    }

    #[test]
    fn test_past_event_is_neutral_not_zero() {
        let weights = HypeWeights::default();
        let past = weights.hype_index(Some(50.0), &PriceTierSet::empty(), Some(-3));
        let unknown = weights.hype_index(Some(50.0), &PriceTierSet::empty(), None);
        assert_eq!(past, unknown);
        assert_eq!(past, 35.0);
    }

    #[test]
    fn test_far_future_recency_floors_at_zero() {
        let weights = HypeWeights::default();
        let c = weights.components(None, &PriceTierSet::empty(), Some(400));
        assert_eq!(c.recency, 0.0);
    }

    #[test]
    fn test_spread_saturates() {
        let weights = HypeWeights::default();
        let huge = PriceTierSet::new(10.0, 100.0, 500.0, 1000.0);
        assert_eq!(weights.components(None, &huge, None).spread, 1.0);
    }

    #[test]
    fn test_bounded_for_any_input() {
        let weights = HypeWeights::default();
        let tier_sets = [
            PriceTierSet::empty(),
            PriceTierSet::new(1.0, 1.0, 1.0, 1.0),
            PriceTierSet::new(0.01, 5.0, 50.0, 10_000.0),
        ];
        let pops = [None, Some(-50.0), Some(0.0), Some(100.0), Some(250.0), Some(f64::NAN)];
        let days = [None, Some(i64::MIN), Some(-1), Some(0), Some(60), Some(i64::MAX)];

        for tiers in &tier_sets {
            for pop in pops {
                for d in days {
                    let h = weights.hype_index(pop, tiers, d);
                    assert!((0.0..=100.0).contains(&h), "{:?} {:?} {:?} -> {}", tiers, pop, d, h);
                }
            }
        }
    }
}
