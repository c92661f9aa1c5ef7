//! Selection identity.
//!
//! A fingerprint is the SHA-256 of the normalised selection (project,
//! experiment, sorted input ids, sorted explainer ids). Two selections that
//! differ only in ordering or duplicates share a fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use xaiboard_common::wire::ExperimentRequest;
use xaiboard_common::{ExperimentId, ExplainerId, InputId, ProjectId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user's current choice of inputs and explainers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub project_id: ProjectId,
    pub experiment_id: ExperimentId,
    #[serde(default)]
    pub input_ids: Vec<InputId>,
    #[serde(default)]
    pub explainer_ids: Vec<ExplainerId>,
}

impl Selection {
    pub fn new(
        project_id: impl Into<String>,
        experiment_id: impl Into<String>,
        input_ids: impl IntoIterator<Item = u64>,
        explainer_ids: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            project_id: ProjectId(project_id.into()),
            experiment_id: ExperimentId(experiment_id.into()),
            input_ids: input_ids.into_iter().map(InputId).collect(),
            explainer_ids: explainer_ids.into_iter().map(ExplainerId).collect(),
        }
    }

    /// Sort and de-duplicate both id sets.
    pub fn normalised(mut self) -> Self {
        self.input_ids.sort();
        self.input_ids.dedup();
        self.explainer_ids.sort();
        self.explainer_ids.dedup();
        self
    }

    /// Empty when either the input set or the explainer set is empty.
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty() || self.explainer_ids.is_empty()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        // precision keeps the first 16 bytes of the digest
        Fingerprint(format!("{:.32x}", self.digest()))
    }

    fn digest(&self) -> sha2::digest::Output<Sha256> {
        let normalised = self.clone().normalised();
        let mut hasher = Sha256::new();
        hasher.update(normalised.project_id.0.as_bytes());
        hasher.update([0u8]);
        hasher.update(normalised.experiment_id.0.as_bytes());
        hasher.update([0u8]);
        for id in &normalised.input_ids {
            hasher.update(id.0.to_le_bytes());
        }
        hasher.update([0u8]);
        for id in &normalised.explainer_ids {
            hasher.update(id.0.to_le_bytes());
        }
        hasher.finalize()
    }

    pub fn to_request(&self) -> ExperimentRequest {
        let normalised = self.clone().normalised();
        ExperimentRequest {
            project_id: normalised.project_id,
            experiment_id: normalised.experiment_id,
            input_ids: normalised.input_ids,
            explainer_ids: normalised.explainer_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_and_duplicates_do_not_matter() {
        let a = Selection::new("p", "e", [3, 1, 2], [5, 4]);
        let b = Selection::new("p", "e", [1, 2, 3, 3], [4, 5, 5]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.to_request(), b.to_request());
    }

    #[test]
    fn test_different_selections_differ() {
        let base = Selection::new("p", "e", [1], [1]);
        assert_ne!(base.fingerprint(), Selection::new("p", "e", [2], [1]).fingerprint());
        assert_ne!(base.fingerprint(), Selection::new("p", "e", [1], [2]).fingerprint());
        assert_ne!(base.fingerprint(), Selection::new("p", "other", [1], [1]).fingerprint());
        assert_eq!(base.fingerprint().as_str().len(), 32);
    }

    #[test]
    fn test_fingerprint_is_digest_prefix() {
        let selection = Selection::new("imagenet", "resnet18", [4, 2], [1]);
        let full = format!("{:x}", selection.digest());
        let fp = selection.fingerprint();
        assert_eq!(full.len(), 64);
        assert_eq!(fp.as_str(), &full[..32]);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_empty_selection() {
        assert!(Selection::new("p", "e", [], [1]).is_empty());
        assert!(Selection::new("p", "e", [1], []).is_empty());
        assert!(!Selection::new("p", "e", [1], [1]).is_empty());
    }

    #[test]
    fn test_request_is_sorted() {
        let req = Selection::new("p", "e", [9, 2], [7, 1]).to_request();
        assert_eq!(req.input_ids, vec![InputId(2), InputId(9)]);
        assert_eq!(req.explainer_ids, vec![ExplainerId(1), ExplainerId(7)]);
    }
}
