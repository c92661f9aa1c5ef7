//! Contract violations raised by the ranking engine.

use thiserror::Error;
use xaiboard_common::{ExplainerId, InputId, XaiboardError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankerError {
    #[error("Empty reference set for metric {metric}")]
    EmptyReferenceSet { metric: String },

    #[error("Invalid weight {weight} for metric {metric}")]
    InvalidWeight { metric: String, weight: f64 },

    #[error("Duplicate explainer {explainer} for input {input}")]
    DuplicateExplainer { input: InputId, explainer: ExplainerId },

    #[error("Duplicate entry for input {0}")]
    DuplicateInput(InputId),

    #[error("Explainer {explainer} missing for input {input}")]
    MissingExplainer { input: InputId, explainer: ExplainerId },

    #[error("Input {0} missing from response")]
    MissingInput(InputId),
}

impl From<RankerError> for XaiboardError {
    fn from(e: RankerError) -> Self {
        match e {
            RankerError::MissingExplainer { .. } | RankerError::MissingInput(_) => {
                XaiboardError::IncompleteResponse(e.to_string())
            }
            other => XaiboardError::MalformedResponse(other.to_string()),
        }
    }
}
