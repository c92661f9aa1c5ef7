//! Canned backend payloads.

use std::collections::BTreeMap;
use xaiboard_common::wire::{
    ExperimentRequest, ExperimentResponse, ExperimentSummary, ExplainerSummary, ExplanationEntry,
    InputEntry, LabelScore, Modality, PredictionWire, ProjectSummary, ProjectsResponse,
};
use xaiboard_common::{ExplainerId, InputId};
use xaiboard_session::Selection;

pub const GRAD_CAM: ExplainerId = ExplainerId(1);
pub const LIME: ExplainerId = ExplainerId(2);

pub fn explanation(id: ExplainerId, name: &str, metrics: &[(&str, Option<f64>)]) -> ExplanationEntry {
    ExplanationEntry {
        explainer_id: id,
        explainer_name: Some(name.to_string()),
        attribution: Some(serde_json::json!([[0.0, 0.5], [0.5, 1.0]])),
        evaluation: metrics.iter().map(|(m, v)| (m.to_string(), *v)).collect(),
    }
}

pub fn input(id: InputId, explanations: Vec<ExplanationEntry>) -> InputEntry {
    InputEntry {
        input_id: id,
        prediction: PredictionWire {
            label: "goldfish".to_string(),
            probabilities: vec![
                LabelScore { label: "goldfish".to_string(), score: 87.5 },
                LabelScore { label: "tench".to_string(), score: 12.5 },
            ],
            is_correct: Some(true),
        },
        explanations,
    }
}

/// Metrics generated for an explainer when a test does not script a response.
///
/// AbPC and Sensitivity favour lower explainer ids; Complexity favours higher
/// ones, so uniform weights rank explainer 1 first while a Complexity-only
/// weighting reverses the order.
pub fn default_metrics(explainer: ExplainerId) -> BTreeMap<String, Option<f64>> {
    let e = f64::from(explainer.0.max(1));
    BTreeMap::from([
        ("AbPC".to_string(), Some(1.0 / e)),
        ("Sensitivity".to_string(), Some(0.1 * e)),
        ("Complexity".to_string(), Some(1.0 / e)),
    ])
}

/// A complete response covering every requested (input, explainer) pair.
pub fn response_for(request: &ExperimentRequest) -> ExperimentResponse {
    let inputs = request
        .input_ids
        .iter()
        .map(|&id| {
            let explanations = request
                .explainer_ids
                .iter()
                .map(|&explainer| ExplanationEntry {
                    explainer_id: explainer,
                    explainer_name: Some(format!("explainer-{explainer}")),
                    attribution: None,
                    evaluation: default_metrics(explainer),
                })
                .collect();
            input(id, explanations)
        })
        .collect();
    ExperimentResponse { inputs }
}

/// GradCam against Lime on a single input: GradCam wins on both metrics.
pub fn grad_cam_vs_lime() -> (Selection, ExperimentResponse) {
    let selection = Selection::new("imagenet", "resnet18", [1], [GRAD_CAM.0, LIME.0]);
    let response = ExperimentResponse {
        inputs: vec![input(InputId(1), vec![
            explanation(GRAD_CAM, "GradCam", &[("MuFidelity", Some(0.58)), ("Sensitivity", Some(0.08))]),
            explanation(LIME, "Lime", &[("MuFidelity", Some(-0.19)), ("Sensitivity", Some(4.35))]),
        ])],
    };
    (selection, response)
}

pub fn sample_projects() -> ProjectsResponse {
    ProjectsResponse {
        projects: vec![ProjectSummary {
            id: "imagenet".into(),
            name: "ImageNet classification".to_string(),
            experiments: vec![ExperimentSummary {
                id: "resnet18".into(),
                name: "ResNet-18".to_string(),
                modality: Modality::Image,
                explainers: vec![
                    ExplainerSummary { id: GRAD_CAM, name: "GradCam".to_string() },
                    ExplainerSummary { id: LIME, name: "Lime".to_string() },
                ],
                metrics: vec!["MuFidelity".to_string(), "Sensitivity".to_string()],
            }],
        }],
    }
}
