//! Full scoring pass over one experiment response.
//!
//! For every requested input:
//!   1. Collect the requested explainers' entries
//!   2. Pad evaluation sets to the union of metric names
//!   3. Normalise each metric across the explainers
//!   4. Combine contributions with the weight vector
//!   5. Rank and assemble

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use xaiboard_common::config::ScoringConfig;
use xaiboard_common::model::{ExperimentResult, Prediction};
use xaiboard_common::wire::{ExperimentRequest, ExperimentResponse, InputEntry};
use xaiboard_common::{InputId, MetricCatalog};

use crate::assembler::{assemble, collect_entries, ExplainerEntry};
use crate::error::RankerError;
use crate::normalise::normalise_metric;
use crate::ranking::{rank, RankedEntry, DEFAULT_TIE_EPSILON};
use crate::scorer::combine;
use crate::weights::WeightVector;

/// How contributions are weighted and ties detected.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    /// `None` → uniform over the metrics present for each input.
    pub weights: Option<WeightVector>,
    pub catalog: MetricCatalog,
    pub tie_epsilon: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: None,
            catalog: MetricCatalog::new(),
            tie_epsilon: DEFAULT_TIE_EPSILON,
        }
    }
}

impl ScoringPolicy {
    pub fn from_config(config: &ScoringConfig) -> Result<Self, RankerError> {
        let weights = config.weights.clone().map(WeightVector::new).transpose()?;
        Ok(Self {
            weights,
            catalog: config.catalog(),
            tie_epsilon: config.tie_epsilon,
        })
    }

    pub fn with_weights(mut self, weights: WeightVector) -> Self {
        self.weights = Some(weights);
        self
    }
}

/// Normalise, combine and rank one input's explainers in place.
/// Fills `contributions` on every entry and returns the ranking.
pub fn score_input(
    input: InputId,
    entries: &mut [ExplainerEntry],
    policy: &ScoringPolicy,
) -> Result<Vec<RankedEntry>, RankerError> {
    let metrics: BTreeSet<String> = entries
        .iter()
        .flat_map(|e| e.evaluation.names().map(str::to_string))
        .collect();

    for entry in entries.iter_mut() {
        entry.evaluation.pad(metrics.iter().map(String::as_str));
    }

    for metric in &metrics {
        let polarity = policy.catalog.polarity(metric);
        let raws: Vec<Option<f64>> = entries.iter().map(|e| e.evaluation.get(metric)).collect();
        let contributions = normalise_metric(metric, &raws, polarity)?;
        for (entry, c) in entries.iter_mut().zip(contributions) {
            entry.contributions.insert(metric.clone(), c);
        }
    }

    let uniform;
    let weights = match &policy.weights {
        Some(w) => w,
        None => {
            uniform = WeightVector::uniform(metrics.iter().map(String::as_str));
            &uniform
        }
    };

    let pairs: Vec<_> = entries
        .iter()
        .map(|e| (e.explainer, combine(&e.contributions, weights)))
        .collect();
    let ranked = rank(input, &pairs, policy.tie_epsilon)?;

    debug!(
        %input,
        metrics = metrics.len(),
        explainers = entries.len(),
        unscored = ranked.iter().filter(|r| !r.score.is_scored()).count(),
        "Scored input"
    );
    Ok(ranked)
}

/// Turn a raw response into ranked results, one per requested input in
/// request order.
pub fn build_results(
    request: &ExperimentRequest,
    response: &ExperimentResponse,
    policy: &ScoringPolicy,
) -> Result<Vec<ExperimentResult>, RankerError> {
    let wanted: BTreeSet<InputId> = request.input_ids.iter().copied().collect();
    let mut by_input: BTreeMap<InputId, &InputEntry> = BTreeMap::new();

    for entry in &response.inputs {
        if !wanted.contains(&entry.input_id) {
            warn!(input = %entry.input_id, "Dropping response entry for an input that was not requested");
            continue;
        }
        if by_input.insert(entry.input_id, entry).is_some() {
            return Err(RankerError::DuplicateInput(entry.input_id));
        }
    }

    request
        .input_ids
        .iter()
        .map(|input| {
            let entry = by_input.get(input).ok_or(RankerError::MissingInput(*input))?;
            let mut entries = collect_entries(*input, &entry.explanations, &request.explainer_ids)?;
            let ranked = score_input(*input, &mut entries, policy)?;
            let prediction = Prediction::from_wire(*input, entry.prediction.clone());
            assemble(*input, prediction, entries, &ranked)
        })
        .collect()
}
