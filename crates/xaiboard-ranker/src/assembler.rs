//! Result assembly: joins ranked scores with predictions and attribution
//! payloads into the per-input view model.

use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;
use xaiboard_common::model::{
    AttributionPayload, EvaluationSet, ExperimentResult, ExplainerResult, Prediction, WeightedScore,
};
use xaiboard_common::wire::ExplanationEntry;
use xaiboard_common::{ExplainerId, InputId};

use crate::error::RankerError;
use crate::ranking::RankedEntry;

/// One explainer's data for one input, before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainerEntry {
    pub explainer: ExplainerId,
    pub explainer_name: Option<String>,
    pub evaluation: EvaluationSet,
    pub contributions: BTreeMap<String, Option<f64>>,
    pub attribution: Option<AttributionPayload>,
}

impl ExplainerEntry {
    pub fn new(explainer: ExplainerId, evaluation: EvaluationSet) -> Self {
        Self {
            explainer,
            explainer_name: None,
            evaluation,
            contributions: BTreeMap::new(),
            attribution: None,
        }
    }

    pub fn with_attribution(mut self, payload: serde_json::Value) -> Self {
        self.attribution = Some(AttributionPayload(payload));
        self
    }

    fn from_wire(entry: &ExplanationEntry) -> Self {
        Self {
            explainer: entry.explainer_id,
            explainer_name: entry.explainer_name.clone(),
            evaluation: EvaluationSet::from_raw(entry.evaluation.clone()),
            contributions: BTreeMap::new(),
            attribution: entry.attribution.clone().map(AttributionPayload),
        }
    }
}

/// Pick the requested explainers out of one input's raw explanations.
///
/// Every requested explainer must be present (possibly with an all-missing
/// evaluation); explainers that were not requested are dropped.
/// Output follows the order of `requested`.
pub fn collect_entries(
    input: InputId,
    explanations: &[ExplanationEntry],
    requested: &[ExplainerId],
) -> Result<Vec<ExplainerEntry>, RankerError> {
    let wanted: BTreeSet<ExplainerId> = requested.iter().copied().collect();
    let mut by_id: BTreeMap<ExplainerId, &ExplanationEntry> = BTreeMap::new();

    for entry in explanations {
        if !wanted.contains(&entry.explainer_id) {
            warn!(%input, explainer = %entry.explainer_id, "Dropping explanation for an explainer that was not requested");
            continue;
        }
        if by_id.insert(entry.explainer_id, entry).is_some() {
            return Err(RankerError::DuplicateExplainer { input, explainer: entry.explainer_id });
        }
    }

    requested
        .iter()
        .map(|id| {
            by_id
                .get(id)
                .map(|e| ExplainerEntry::from_wire(e))
                .ok_or(RankerError::MissingExplainer { input, explainer: *id })
        })
        .collect()
}

/// Build the `ExperimentResult` for one input.
///
/// `ranked` must already be in display order (rank ascending, id ascending
/// within a rank); the explainer list of the result follows it exactly.
pub fn assemble(
    input: InputId,
    prediction: Prediction,
    entries: Vec<ExplainerEntry>,
    ranked: &[RankedEntry],
) -> Result<ExperimentResult, RankerError> {
    let mut by_id: BTreeMap<ExplainerId, ExplainerEntry> = BTreeMap::new();
    for entry in entries {
        let id = entry.explainer;
        if by_id.insert(id, entry).is_some() {
            return Err(RankerError::DuplicateExplainer { input, explainer: id });
        }
    }

    let mut explainers = Vec::with_capacity(ranked.len());
    for r in ranked {
        let entry = by_id
            .remove(&r.explainer)
            .ok_or(RankerError::MissingExplainer { input, explainer: r.explainer })?;
        explainers.push(ExplainerResult {
            explainer: entry.explainer,
            explainer_name: entry.explainer_name,
            evaluation: entry.evaluation,
            contributions: entry.contributions,
            attribution: entry.attribution,
            score: WeightedScore {
                input,
                explainer: r.explainer,
                combined: r.score,
                rank: r.rank,
            },
        });
    }

    if let Some(unranked) = by_id.keys().next() {
        return Err(RankerError::MissingExplainer { input, explainer: *unranked });
    }

    Ok(ExperimentResult { input, prediction, explainers })
}
