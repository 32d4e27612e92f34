//! Collapse observed prices into a four-point tier ladder
//!
//! Works on any sample count: 0 samples yields an empty ladder, 1-3
//! samples are spread over the four tiers, and 4+ samples are cut at
//! index-based tertiles (`n/3`, `2n/3`). The tertile cut is not an
//! interpolated quantile and must stay that way for reproducible output.

use crate::model::{PriceSample, PriceTierSet};

/// Round to cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Deduplicate, drop non-positive / non-finite samples, sort ascending
fn normalize(samples: &[PriceSample]) -> Vec<f64> {
    let mut prices: Vec<f64> = samples
        .iter()
        .copied()
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();
    prices.sort_by(|a, b| a.total_cmp(b));
    prices.dedup();
    prices
}

/// Map a price-sample list to `{upper, mid, floor, vip}`
pub fn tier_map(samples: &[PriceSample]) -> PriceTierSet {
    let p = normalize(samples);
    let n = p.len();

    match n {
        0 => PriceTierSet::empty(),
        1 => PriceTierSet::new(p[0], p[0], p[0], p[0]),
        2 => {
            let (lo, hi) = (p[0], p[1]);
            // Interpolate a third of the way from each end. Rounding to cents
            // can drop mid below a sub-cent upper (10.004, 10.005).
            let mid = round2((2.0 * lo + hi) / 3.0);
            let floor = round2((lo + 2.0 * hi) / 3.0);
            PriceTierSet::new(lo, mid, floor, hi)
        }
        3 => PriceTierSet::new(p[0], p[1], p[1], p[2]),
        _ => PriceTierSet::new(p[0], p[n / 3], p[(2 * n) / 3], p[n - 1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder(tiers: &PriceTierSet) -> [f64; 4] {
        [
            tiers.upper.unwrap(),
            tiers.mid.unwrap(),
            tiers.floor.unwrap(),
            tiers.vip.unwrap(),
        ]
    }

    #[test]
    fn test_empty_input() {
        assert!(tier_map(&[]).is_empty());
        // Only non-positive values is the same as nothing
        assert!(tier_map(&[0.0, -5.0, f64::NAN]).is_empty());
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(ladder(&tier_map(&[42.0])), [42.0; 4]);
    }

    #[test]
    fn test_two_samples_interpolate() {
        assert_eq!(ladder(&tier_map(&[20.0, 10.0])), [10.0, 13.33, 16.67, 20.0]);
    }

    #[test]
    fn test_two_sub_cent_samples_round_below_upper() {
        let tiers = tier_map(&[10.005, 10.004]);
        assert_eq!(ladder(&tiers), [10.004, 10.0, 10.0, 10.005]);
        assert!(tiers.mid.unwrap() < tiers.upper.unwrap());
    }

    #[test]
    fn test_three_samples_share_middle() {
        assert_eq!(ladder(&tier_map(&[30.0, 10.0, 20.0])), [10.0, 20.0, 20.0, 30.0]);
    }

    #[test]
    fn test_four_samples_tertiles() {
        assert_eq!(ladder(&tier_map(&[10.0, 20.0, 30.0, 40.0])), [10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_duplicates_collapse_before_counting() {
        // Dedup leaves two distinct prices
        assert_eq!(
            ladder(&tier_map(&[10.0, 10.0, 20.0, 20.0])),
            [10.0, 13.33, 16.67, 20.0]
        );
    }

    #[test]
    fn test_large_sample_index_sampling() {
        let samples: Vec<f64> = (1..=10).map(|i| i as f64 * 10.0).collect();
        // n=10: indices 0, 3, 6, 9
        assert_eq!(ladder(&tier_map(&samples)), [10.0, 40.0, 70.0, 100.0]);
    }

    #[test]
    fn test_ladder_is_ascending() {
        let inputs: Vec<Vec<f64>> = vec![
            vec![5.0],
            vec![99.5, 12.25],
            vec![1.0, 1000.0, 3.0],
            vec![45.0, 12.0, 300.0, 89.0, 150.0],
            (1..=37).map(|i| (i * i) as f64 * 1.5).collect(),
        ];

        for input in inputs {
            let [upper, mid, floor, vip] = ladder(&tier_map(&input));
            assert!(upper <= mid && mid <= floor && floor <= vip, "{:?}", input);
        }
    }
}
