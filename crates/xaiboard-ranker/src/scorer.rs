//! Weighted combination of normalised metric contributions.
//!
//! S(i, e) = Σ w_m × c_m / Σ w_m over metrics with w_m > 0

use std::collections::BTreeMap;
use tracing::warn;
use xaiboard_common::model::Score;

use crate::weights::WeightVector;

/// Combine one pair's contributions into a single score in [0, 1].
///
/// A pair is `Unscored` when any metric carrying a positive weight is missing,
/// or when no weighted metric is present at all. Partial scores are never
/// produced. Contributions whose metric has no weight are ignored. A
/// non-finite result is never reported as `Scored`.
pub fn combine(contributions: &BTreeMap<String, Option<f64>>, weights: &WeightVector) -> Score {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for (metric, contribution) in contributions {
        let Some(weight) = weights.get(metric) else {
            warn!(metric = %metric, "Metric has no configured weight; ignored in combined score");
            continue;
        };
        if weight <= 0.0 {
            continue;
        }
        match contribution {
            Some(c) => {
                weighted_sum += weight * c;
                weight_total += weight;
            }
            None => return Score::Unscored,
        }
    }

    if weight_total <= 0.0 {
        return Score::Unscored;
    }
    let score = weighted_sum / weight_total;
    if !score.is_finite() {
        warn!(weighted_sum, weight_total, "Combined score is not finite; pair left unscored");
        return Score::Unscored;
    }
    Score::Scored(score.clamp(0.0, 1.0))
}
