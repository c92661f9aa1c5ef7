//! Request orchestrator: one fetch → assemble → ready cycle per selection.
//!
//!   Idle ──select──▶ Loading ──complete(ok)──▶ Ready
//!                       │    ──complete(err)─▶ Failed
//!   any ──empty selection──▶ Idle
//!   Ready/Failed ──new selection──▶ Loading
//!
//! Completions are applied only when their tag equals the tag of the cycle
//! currently loading. Everything else is stale and discarded whole.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use xaiboard_common::model::ExperimentResult;
use xaiboard_common::wire::{ExperimentRequest, ExperimentResponse};
use xaiboard_common::{ErrorKind, Result, XaiboardError};
use xaiboard_ranker::{build_results, ScoringPolicy, WeightVector};

use crate::fingerprint::{Fingerprint, Selection};
use crate::view::DashboardView;

/// Identity of one issued fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestTag {
    pub fingerprint: Fingerprint,
    /// Per-session sequence number; distinguishes re-selections of the same
    /// fingerprint.
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub enum RequestState {
    Idle,
    Loading {
        tag: RequestTag,
        request: ExperimentRequest,
    },
    Ready {
        tag: RequestTag,
        request: ExperimentRequest,
        response: Arc<ExperimentResponse>,
        results: Arc<Vec<ExperimentResult>>,
        completed_at: DateTime<Utc>,
    },
    Failed {
        tag: RequestTag,
        kind: ErrorKind,
    },
}

impl RequestState {
    pub fn tag(&self) -> Option<&RequestTag> {
        match self {
            RequestState::Idle => None,
            RequestState::Loading { tag, .. }
            | RequestState::Ready { tag, .. }
            | RequestState::Failed { tag, .. } => Some(tag),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading { .. })
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            RequestState::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn results(&self) -> Option<&[ExperimentResult]> {
        match self {
            RequestState::Ready { results, .. } => Some(results.as_slice()),
            _ => None,
        }
    }
}

/// The request to send and the tag to complete it with.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub tag: RequestTag,
    pub request: ExperimentRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Ready { inputs: usize },
    Failed(ErrorKind),
    /// The completion belonged to a superseded cycle and was discarded.
    Stale,
}

/// Owns `RequestState`; the only writer of it.
#[derive(Debug)]
pub struct RequestOrchestrator {
    state: RequestState,
    policy: ScoringPolicy,
    next_seq: u64,
}

impl RequestOrchestrator {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { state: RequestState::Idle, policy, next_seq: 0 }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn view(&self) -> DashboardView {
        DashboardView::from_state(&self.state)
    }

    /// Apply a selection change.
    ///
    /// Returns the fetch to issue, or `None` when the selection is empty
    /// (state becomes `Idle`) or identical to the one loading or shown.
    pub fn select(&mut self, selection: Selection) -> Option<FetchTicket> {
        let selection = selection.normalised();
        if selection.is_empty() {
            if !matches!(self.state, RequestState::Idle) {
                info!("Selection cleared; results discarded");
            }
            self.state = RequestState::Idle;
            return None;
        }

        let fingerprint = selection.fingerprint();
        if let RequestState::Loading { tag, .. } | RequestState::Ready { tag, .. } = &self.state {
            if tag.fingerprint == fingerprint {
                debug!(%fingerprint, seq = tag.seq, "Selection unchanged; no new request");
                return None;
            }
        }

        self.next_seq += 1;
        let tag = RequestTag { fingerprint, seq: self.next_seq };
        let request = selection.to_request();
        info!(
            fingerprint = %tag.fingerprint,
            seq = tag.seq,
            inputs = request.input_ids.len(),
            explainers = request.explainer_ids.len(),
            "Issuing experiment request"
        );
        self.state = RequestState::Loading { tag: tag.clone(), request: request.clone() };
        Some(FetchTicket { tag, request })
    }

    /// Apply the outcome of a fetch.
    pub fn complete(&mut self, tag: &RequestTag, outcome: Result<ExperimentResponse>) -> Completion {
        let request = match &self.state {
            RequestState::Loading { tag: current, request } if current == tag => request.clone(),
            _ => {
                debug!(fingerprint = %tag.fingerprint, seq = tag.seq, "Discarding stale response");
                return Completion::Stale;
            }
        };

        let response = match outcome {
            Ok(response) => response,
            Err(e) => return self.fail(tag.clone(), &e),
        };

        match build_results(&request, &response, &self.policy) {
            Ok(results) => {
                let inputs = results.len();
                info!(fingerprint = %tag.fingerprint, seq = tag.seq, inputs, "Experiment results ready");
                self.state = RequestState::Ready {
                    tag: tag.clone(),
                    request,
                    response: Arc::new(response),
                    results: Arc::new(results),
                    completed_at: Utc::now(),
                };
                Completion::Ready { inputs }
            }
            Err(e) => self.fail(tag.clone(), &XaiboardError::from(e)),
        }
    }

    /// Replace the weight vector (`None` → uniform). When results are shown
    /// they are rebuilt from the retained response; no fetch is issued.
    /// Returns whether results were rebuilt.
    pub fn reweight(&mut self, weights: Option<WeightVector>) -> bool {
        self.policy.weights = weights;

        let (tag, request, response) = match &self.state {
            RequestState::Ready { tag, request, response, .. } => {
                (tag.clone(), request.clone(), Arc::clone(response))
            }
            _ => return false,
        };

        match build_results(&request, &response, &self.policy) {
            Ok(results) => {
                info!(fingerprint = %tag.fingerprint, seq = tag.seq, "Results re-ranked with new weights");
                self.state = RequestState::Ready {
                    tag,
                    request,
                    response,
                    results: Arc::new(results),
                    completed_at: Utc::now(),
                };
                true
            }
            Err(e) => {
                self.fail(tag, &XaiboardError::from(e));
                false
            }
        }
    }

    fn fail(&mut self, tag: RequestTag, error: &XaiboardError) -> Completion {
        let kind = error.kind();
        warn!(fingerprint = %tag.fingerprint, seq = tag.seq, error = %error, "Experiment request failed");
        self.state = RequestState::Failed { tag, kind };
        Completion::Failed(kind)
    }
}

impl Default for RequestOrchestrator {
    fn default() -> Self {
        Self::new(ScoringPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;
    use xaiboard_common::wire::{ExplanationEntry, InputEntry, LabelScore, PredictionWire};
    use xaiboard_common::{ExplainerId, InputId};

    fn response_for(request: &ExperimentRequest, metric: &str) -> ExperimentResponse {
        let inputs = request
            .input_ids
            .iter()
            .map(|&input_id| InputEntry {
                input_id,
                prediction: PredictionWire {
                    label: "cat".into(),
                    probabilities: vec![LabelScore { label: "cat".into(), score: 100.0 }],
                    is_correct: Some(true),
                },
                explanations: request
                    .explainer_ids
                    .iter()
                    .map(|&explainer_id| ExplanationEntry {
                        explainer_id,
                        explainer_name: None,
                        attribution: None,
                        evaluation: BTreeMap::from([(metric.to_string(), Some(explainer_id.0 as f64))]),
                    })
                    .collect(),
            })
            .collect();
        ExperimentResponse { inputs }
    }

    #[test]
    fn test_select_enters_loading() {
        let mut orch = RequestOrchestrator::default();
        let ticket = orch.select(Selection::new("p", "e", [1], [1, 2])).unwrap();
        assert!(orch.state().is_loading());
        assert_eq!(orch.state().tag(), Some(&ticket.tag));
        assert!(orch.view().loading);
    }

    #[test]
    fn test_success_enters_ready() {
        let mut orch = RequestOrchestrator::default();
        let ticket = orch.select(Selection::new("p", "e", [1], [1, 2])).unwrap();
        let completion = orch.complete(&ticket.tag, Ok(response_for(&ticket.request, "AbPC")));
        assert_eq!(completion, Completion::Ready { inputs: 1 });
        let results = orch.state().results().unwrap();
        // AbPC higher is better: explainer 2 wins
        assert_eq!(results[0].ranks(), vec![(ExplainerId(2), 1), (ExplainerId(1), 2)]);
        assert!(!orch.view().loading);
    }

    #[test]
    fn test_stale_response_rejected() {
        let mut orch = RequestOrchestrator::default();
        let s1 = orch.select(Selection::new("p", "e", [1], [1])).unwrap();
        let s2 = orch.select(Selection::new("p", "e", [2], [1])).unwrap();

        let r2 = orch.complete(&s2.tag, Ok(response_for(&s2.request, "AbPC")));
        assert_eq!(r2, Completion::Ready { inputs: 1 });
        let r1 = orch.complete(&s1.tag, Ok(response_for(&s1.request, "AbPC")));
        assert_eq!(r1, Completion::Stale);

        let results = orch.state().results().unwrap();
        assert_eq!(results[0].input, InputId(2));
        assert_eq!(orch.state().tag(), Some(&s2.tag));
    }

    #[test]
    fn test_stale_failure_does_not_clobber() {
        let mut orch = RequestOrchestrator::default();
        let s1 = orch.select(Selection::new("p", "e", [1], [1])).unwrap();
        let s2 = orch.select(Selection::new("p", "e", [2], [1])).unwrap();
        let stale = orch.complete(&s1.tag, Err(XaiboardError::Fetch("boom".into())));
        assert_eq!(stale, Completion::Stale);
        assert!(orch.state().is_loading());
        assert_eq!(orch.state().tag(), Some(&s2.tag));
    }

    #[test]
    fn test_reselecting_same_fingerprint_gets_new_seq() {
        let mut orch = RequestOrchestrator::default();
        let s1 = orch.select(Selection::new("p", "e", [1], [1])).unwrap();
        let _s2 = orch.select(Selection::new("p", "e", [2], [1])).unwrap();
        let s1_again = orch.select(Selection::new("p", "e", [1], [1])).unwrap();
        assert_eq!(s1.tag.fingerprint, s1_again.tag.fingerprint);
        assert_ne!(s1.tag, s1_again.tag);
        assert_eq!(orch.complete(&s1.tag, Ok(response_for(&s1.request, "AbPC"))), Completion::Stale);
    }

    #[test]
    fn test_unchanged_selection_is_noop() {
        let mut orch = RequestOrchestrator::default();
        let s1 = orch.select(Selection::new("p", "e", [1, 2], [1])).unwrap();
        assert!(orch.select(Selection::new("p", "e", [2, 1], [1])).is_none());
        orch.complete(&s1.tag, Ok(response_for(&s1.request, "AbPC")));
        assert!(orch.select(Selection::new("p", "e", [1, 2], [1])).is_none());
    }

    #[test]
    fn test_failed_selection_can_be_retried() {
        let mut orch = RequestOrchestrator::default();
        let s1 = orch.select(Selection::new("p", "e", [1], [1])).unwrap();
        orch.complete(&s1.tag, Err(XaiboardError::Timeout(Duration::from_secs(30))));
        assert_eq!(orch.state().error(), Some(ErrorKind::Timeout));
        assert!(orch.select(Selection::new("p", "e", [1], [1])).is_some());
    }

    #[test]
    fn test_empty_selection_goes_idle() {
        let mut orch = RequestOrchestrator::default();
        let s1 = orch.select(Selection::new("p", "e", [1], [1])).unwrap();
        orch.complete(&s1.tag, Ok(response_for(&s1.request, "AbPC")));
        assert!(orch.select(Selection::new("p", "e", [1], [])).is_none());
        assert!(matches!(orch.state(), RequestState::Idle));
        assert!(orch.view().results.is_empty());
    }

    #[test]
    fn test_incomplete_response_fails() {
        let mut orch = RequestOrchestrator::default();
        let ticket = orch.select(Selection::new("p", "e", [1], [1, 2])).unwrap();
        let mut response = response_for(&ticket.request, "AbPC");
        response.inputs[0].explanations.pop();
        let completion = orch.complete(&ticket.tag, Ok(response));
        assert_eq!(completion, Completion::Failed(ErrorKind::IncompleteResponse));
        assert_eq!(orch.view().error, Some(ErrorKind::IncompleteResponse));
    }

    #[test]
    fn test_reweight_reranks_without_fetch() {
        let mut orch = RequestOrchestrator::default();
        let ticket = orch.select(Selection::new("p", "e", [1], [1, 2])).unwrap();
        let mut response = response_for(&ticket.request, "MuFidelity");
        // explainer 1: MuFidelity 1, Complexity 1 (best); explainer 2: MuFidelity 2, Complexity 9
        response.inputs[0].explanations[0].evaluation.insert("Complexity".into(), Some(1.0));
        response.inputs[0].explanations[1].evaluation.insert("Complexity".into(), Some(9.0));
        orch.complete(&ticket.tag, Ok(response));

        let only_fidelity = WeightVector::uniform(["MuFidelity"]);
        assert!(orch.reweight(Some(only_fidelity)));
        assert_eq!(orch.state().results().unwrap()[0].explainers[0].explainer, ExplainerId(2));

        let only_complexity = WeightVector::uniform(["Complexity"]);
        assert!(orch.reweight(Some(only_complexity)));
        assert_eq!(orch.state().results().unwrap()[0].explainers[0].explainer, ExplainerId(1));
    }

    #[test]
    fn test_reweight_while_idle_only_updates_policy() {
        let mut orch = RequestOrchestrator::default();
        assert!(!orch.reweight(Some(WeightVector::uniform(["AbPC"]))));
        assert!(orch.policy().weights.is_some());
    }
}
