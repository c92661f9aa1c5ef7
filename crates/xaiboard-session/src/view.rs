//! Read-only view model consumed by the display layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use xaiboard_common::model::ExperimentResult;
use xaiboard_common::ErrorKind;

use crate::fingerprint::Fingerprint;
use crate::orchestrator::RequestState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub loading: bool,
    pub error: Option<ErrorKind>,
    pub error_message: Option<&'static str>,
    pub fingerprint: Option<Fingerprint>,
    pub updated_at: Option<DateTime<Utc>>,
    /// One entry per input, explainers pre-sorted by rank.
    pub results: Vec<ExperimentResult>,
}

impl DashboardView {
    pub fn from_state(state: &RequestState) -> Self {
        let (results, updated_at) = match state {
            RequestState::Ready { results, completed_at, .. } => (results.as_ref().clone(), Some(*completed_at)),
            _ => (Vec::new(), None),
        };
        let error = state.error();
        Self {
            loading: state.is_loading(),
            error,
            error_message: error.map(ErrorKind::message),
            fingerprint: state.tag().map(|t| t.fingerprint.clone()),
            updated_at,
            results,
        }
    }
}
