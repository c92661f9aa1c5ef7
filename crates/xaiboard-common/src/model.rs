//! Domain model of the ranking engine and its view-model output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::ids::{ExplainerId, InputId};
use crate::wire::PredictionWire;

/// Tolerance on the probability sum (scores are percentages).
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

// ── Metrics ───────────────────────────────────────────────────────────────────

/// One raw metric value for an (input, explainer) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub name: String,
    /// `None` when no evaluation was performed (e.g. skipped on OOM).
    pub raw: Option<f64>,
}

/// Metric name → raw value for one (input, explainer) pair.
///
/// Missing evaluations are explicit `None` entries. Sets compared together
/// are padded to the same key set with [`EvaluationSet::pad`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationSet(BTreeMap<String, Option<f64>>);

impl EvaluationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw backend values. Non-finite values become missing.
    pub fn from_raw(values: BTreeMap<String, Option<f64>>) -> Self {
        let cleaned = values
            .into_iter()
            .map(|(name, raw)| {
                let raw = match raw {
                    Some(v) if !v.is_finite() => {
                        warn!(metric = %name, value = v, "Non-finite metric value treated as missing");
                        None
                    }
                    other => other,
                };
                (name, raw)
            })
            .collect();
        Self(cleaned)
    }

    pub fn insert(&mut self, name: impl Into<String>, raw: Option<f64>) {
        self.0.insert(name.into(), raw);
    }

    pub fn with(mut self, name: &str, raw: Option<f64>) -> Self {
        self.insert(name, raw);
        self
    }

    /// Raw value of a metric; `None` for both "absent" and "not evaluated".
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied().flatten()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = MetricValue> + '_ {
        self.0.iter().map(|(name, raw)| MetricValue { name: name.clone(), raw: *raw })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add an explicit missing marker for every name not already present.
    pub fn pad<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.0.entry(name.to_string()).or_insert(None);
        }
    }
}

// ── Prediction ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub true_label: String,
    /// Sorted by score descending, label ascending on ties.
    pub probabilities: Vec<(String, f64)>,
    pub is_correct: bool,
}

impl Prediction {
    /// Build a prediction, deriving `is_correct` from the argmax.
    pub fn new(true_label: impl Into<String>, mut probabilities: Vec<(String, f64)>) -> Self {
        probabilities.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let true_label = true_label.into();
        let is_correct = probabilities
            .first()
            .map(|(label, _)| *label == true_label)
            .unwrap_or(false);
        Self { true_label, probabilities, is_correct }
    }

    /// Convert a backend prediction, checking its invariants.
    ///
    /// A disagreeing `isCorrect` flag is overridden by the argmax; a sum far
    /// from 100 is reported but kept.
    pub fn from_wire(input: InputId, wire: PredictionWire) -> Self {
        let probabilities = wire
            .probabilities
            .into_iter()
            .map(|ls| (ls.label, ls.score))
            .collect();
        let prediction = Self::new(wire.label, probabilities);

        if let Some(flag) = wire.is_correct {
            if flag != prediction.is_correct {
                warn!(%input, upstream = flag, derived = prediction.is_correct,
                    "Upstream isCorrect disagrees with argmax; using argmax");
            }
        }
        if !prediction.probabilities.is_empty() {
            let sum = prediction.probability_sum();
            if (sum - 100.0).abs() > PROBABILITY_SUM_TOLERANCE {
                warn!(%input, sum, "Class probabilities do not sum to 100");
            }
        }
        prediction
    }

    pub fn probability_sum(&self) -> f64 {
        self.probabilities.iter().map(|(_, s)| s).sum()
    }

    /// Predicted label (argmax), if any scores were provided.
    pub fn predicted_label(&self) -> Option<&str> {
        self.probabilities.first().map(|(l, _)| l.as_str())
    }
}

// ── Scores ────────────────────────────────────────────────────────────────────

/// Opaque renderable attribution data; never inspected by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributionPayload(pub serde_json::Value);

/// Combined score of one (input, explainer) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Score {
    Scored(f64),
    /// A required metric was missing; reported in-band, not an error.
    Unscored,
}

impl Score {
    pub fn value(self) -> Option<f64> {
        match self {
            Score::Scored(v) => Some(v),
            Score::Unscored => None,
        }
    }

    pub fn is_scored(self) -> bool {
        matches!(self, Score::Scored(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedScore {
    pub input: InputId,
    pub explainer: ExplainerId,
    pub combined: Score,
    /// 1-based competition rank.
    pub rank: u32,
}

// ── View model ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainerResult {
    pub explainer: ExplainerId,
    pub explainer_name: Option<String>,
    pub evaluation: EvaluationSet,
    /// Normalised per-metric contributions (`None` where missing).
    pub contributions: BTreeMap<String, Option<f64>>,
    pub attribution: Option<AttributionPayload>,
    pub score: WeightedScore,
}

impl ExplainerResult {
    pub fn is_renderable(&self) -> bool {
        self.attribution.is_some()
    }
}

/// Everything displayed for one input, explainers sorted by rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub input: InputId,
    pub prediction: Prediction,
    pub explainers: Vec<ExplainerResult>,
}

impl ExperimentResult {
    /// Explainers holding rank 1.
    pub fn best(&self) -> impl Iterator<Item = &ExplainerResult> {
        self.explainers
            .iter()
            .filter(|e| e.score.rank == 1 && e.score.combined.is_scored())
    }

    pub fn ranks(&self) -> Vec<(ExplainerId, u32)> {
        self.explainers.iter().map(|e| (e.explainer, e.score.rank)).collect()
    }
}
