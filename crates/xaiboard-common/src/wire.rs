//! Wire contract of the explanation backend.
//!
//! These are the raw request/response payloads exchanged with the
//! explanation-generation service. Field names follow the backend's
//! camelCase JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::{ExperimentId, ExplainerId, InputId, ProjectId};

// ── Experiment fetch ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentRequest {
    pub project_id: ProjectId,
    pub experiment_id: ExperimentId,
    pub input_ids: Vec<InputId>,
    pub explainer_ids: Vec<ExplainerId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperimentResponse {
    #[serde(default)]
    pub inputs: Vec<InputEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEntry {
    pub input_id: InputId,
    pub prediction: PredictionWire,
    #[serde(default)]
    pub explanations: Vec<ExplanationEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionWire {
    /// Ground-truth label of the input.
    pub label: String,
    #[serde(default)]
    pub probabilities: Vec<LabelScore>,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationEntry {
    pub explainer_id: ExplainerId,
    #[serde(default)]
    pub explainer_name: Option<String>,
    /// Renderable attribution map; absent when the backend skipped it.
    #[serde(default)]
    pub attribution: Option<serde_json::Value>,
    /// metric name → raw value (null when the evaluation was skipped)
    #[serde(default)]
    pub evaluation: BTreeMap<String, Option<f64>>,
}

// ── Bootstrap fetch ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectsResponse {
    #[serde(default)]
    pub projects: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub experiments: Vec<ExperimentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub id: ExperimentId,
    pub name: String,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub explainers: Vec<ExplainerSummary>,
    #[serde(default)]
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainerSummary {
    pub id: ExplainerId,
    pub name: String,
}

/// Data modality of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    #[default]
    Image,
    Tabular,
    Text,
    TimeSeries,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_response() {
        let body = r#"{
            "inputs": [{
                "inputId": 7,
                "prediction": {
                    "label": "cat",
                    "probabilities": [{"label": "cat", "score": 91.5}, {"label": "dog", "score": 8.5}],
                    "isCorrect": true
                },
                "explanations": [
                    {"explainerId": 1, "explainerName": "GradCam", "attribution": [[0.1, 0.2]],
                     "evaluation": {"MuFidelity": 0.58, "Sensitivity": null}},
                    {"explainerId": 2, "evaluation": {}}
                ]
            }]
        }"#;
        let resp: ExperimentResponse = serde_json::from_str(body).unwrap();
        let input = &resp.inputs[0];
        assert_eq!(input.input_id, InputId(7));
        assert_eq!(input.explanations.len(), 2);
        assert_eq!(input.explanations[0].evaluation["MuFidelity"], Some(0.58));
        assert_eq!(input.explanations[0].evaluation["Sensitivity"], None);
        assert!(input.explanations[1].attribution.is_none());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let req = ExperimentRequest {
            project_id: "p1".into(),
            experiment_id: "e1".into(),
            input_ids: vec![InputId(3)],
            explainer_ids: vec![ExplainerId(1), ExplainerId(4)],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["inputIds"], serde_json::json!([3]));
        assert_eq!(json["explainerIds"], serde_json::json!([1, 4]));
    }

    #[test]
    fn test_modality_defaults_to_image() {
        let exp: ExperimentSummary = serde_json::from_str(r#"{"id": "e", "name": "E"}"#).unwrap();
        assert_eq!(exp.modality, Modality::Image);
    }
}
