//! Metric normalisation.
//!
//! Min-max within the reference set of one metric across the explainers
//! compared for one input. Values are oriented first so that a higher
//! contribution always means a better explanation.

use xaiboard_common::Polarity;

use crate::error::RankerError;

/// Min-max normalisation within a given range [min_val, max_val].
///
/// A range holding a single distinct value gives 0.5. The spread is taken in
/// halved space when the full difference overflows.
pub fn minmax_normalise(value: f64, min_val: f64, max_val: f64) -> f64 {
    if max_val == min_val {
        return 0.5; // degenerate case
    }
    let spread = max_val - min_val;
    let c = if spread.is_finite() {
        (value - min_val) / spread
    } else {
        (value / 2.0 - min_val / 2.0) / (max_val / 2.0 - min_val / 2.0)
    };
    c.clamp(0.0, 1.0)
}

/// Normalise one raw value against the raw reference values of its metric.
///
/// Returns `Ok(None)` when `raw` is missing; 0 is a valid contribution and is
/// never used as a stand-in. A present value with an empty reference set is a
/// contract violation.
pub fn normalize(
    metric: &str,
    raw: Option<f64>,
    reference: &[f64],
    polarity: Polarity,
) -> Result<Option<f64>, RankerError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let (min, max) = oriented_bounds(reference, polarity).ok_or_else(|| {
        RankerError::EmptyReferenceSet { metric: metric.to_string() }
    })?;
    Ok(Some(minmax_normalise(polarity.orient(raw), min, max)))
}

/// Normalise every explainer's value of one metric at once.
/// The reference set is the present values; missing entries stay missing.
pub fn normalise_metric(
    metric: &str,
    raws: &[Option<f64>],
    polarity: Polarity,
) -> Result<Vec<Option<f64>>, RankerError> {
    let reference: Vec<f64> = raws.iter().flatten().copied().collect();
    raws.iter()
        .map(|raw| normalize(metric, *raw, &reference, polarity))
        .collect()
}

fn oriented_bounds(reference: &[f64], polarity: Polarity) -> Option<(f64, f64)> {
    let mut iter = reference.iter().map(|&v| polarity.orient(v));
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minmax_basic() {
        assert!((minmax_normalise(5.0, 0.0, 10.0) - 0.5).abs() < 1e-12);
        assert_eq!(minmax_normalise(-3.0, 0.0, 10.0), 0.0);
        assert_eq!(minmax_normalise(12.0, 0.0, 10.0), 1.0);
    }

    #[test]
    fn test_single_distinct_value_is_half() {
        let raws = [Some(0.3), Some(0.3), Some(0.3)];
        let normed = normalise_metric("MuFidelity", &raws, Polarity::HigherIsBetter).unwrap();
        assert_eq!(normed, vec![Some(0.5); 3]);

        let single = normalise_metric("MuFidelity", &[Some(-7.0)], Polarity::LowerIsBetter).unwrap();
        assert_eq!(single, vec![Some(0.5)]);
    }

    #[test]
    fn test_lower_is_better_inverts() {
        // Sensitivity: GradCam 0.08 beats Lime 4.35
        let normed = normalise_metric("Sensitivity", &[Some(0.08), Some(4.35)], Polarity::LowerIsBetter).unwrap();
        assert_eq!(normed, vec![Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_missing_stays_missing() {
        let normed = normalise_metric("AbPC", &[Some(1.0), None, Some(3.0)], Polarity::HigherIsBetter).unwrap();
        assert_eq!(normed, vec![Some(0.0), None, Some(1.0)]);
    }

    #[test]
    fn test_all_missing() {
        let normed = normalise_metric("AbPC", &[None, None], Polarity::HigherIsBetter).unwrap();
        assert_eq!(normed, vec![None, None]);
    }

    #[test]
    fn test_empty_reference_is_contract_violation() {
        let err = normalize("MoRF", Some(0.2), &[], Polarity::LowerIsBetter).unwrap_err();
        assert_eq!(err, RankerError::EmptyReferenceSet { metric: "MoRF".into() });
    }

    #[test]
    fn test_bounded_for_arbitrary_scales() {
        let raws = [Some(-1e6), Some(3.5), Some(42.0), Some(1e9), Some(-0.001)];
        for polarity in [Polarity::HigherIsBetter, Polarity::LowerIsBetter] {
            let normed = normalise_metric("Complexity", &raws, polarity).unwrap();
            for c in normed.into_iter().flatten() {
                assert!((0.0..=1.0).contains(&c), "contribution {c} out of range");
            }
        }

        let extremes = [Some(-1e308), Some(1e308), Some(f64::MAX), Some(-f64::MAX)];
        for polarity in [Polarity::HigherIsBetter, Polarity::LowerIsBetter] {
            let normed = normalise_metric("AbPC", &extremes, polarity).unwrap();
            for c in normed.into_iter().flatten() {
                assert!((0.0..=1.0).contains(&c), "contribution {c} out of range");
            }
        }
    }

    #[test]
    fn test_extreme_spread_does_not_overflow() {
        let normed = normalise_metric("AbPC", &[Some(-1e308), Some(1e308)], Polarity::HigherIsBetter).unwrap();
        assert_eq!(normed, vec![Some(0.0), Some(1.0)]);
        let normed = normalise_metric("MoRF", &[Some(-1e308), Some(0.0), Some(1e308)], Polarity::LowerIsBetter).unwrap();
        assert_eq!(normed, vec![Some(1.0), Some(0.5), Some(0.0)]);
    }

    #[test]
    fn test_tiny_distinct_values_still_discriminate() {
        let normed = normalise_metric("MuFidelity", &[Some(1e-12), Some(3e-12)], Polarity::HigherIsBetter).unwrap();
        assert_eq!(normed, vec![Some(0.0), Some(1.0)]);
        let normed = normalise_metric("Sensitivity", &[Some(2e-300), Some(1e-300)], Polarity::LowerIsBetter).unwrap();
        assert_eq!(normed, vec![Some(0.0), Some(1.0)]);
    }
}
