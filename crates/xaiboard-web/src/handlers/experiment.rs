//! Selection, weighting and the ranked view.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;
use xaiboard_ranker::WeightVector;
use xaiboard_session::{DashboardView, Fingerprint, Selected, Selection};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    Loading,
    Unchanged,
    Idle,
}

#[derive(Debug, Serialize)]
pub struct SelectionAck {
    pub status: SelectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct WeightsAck {
    /// Whether shown results were re-ranked.
    pub rebuilt: bool,
}

/// PUT /api/selection: change the selected inputs and explainers
pub async fn put_selection(
    State(state): State<SharedState>,
    Json(selection): Json<Selection>,
) -> Result<(StatusCode, Json<SelectionAck>), ApiError> {
    if let Some(kind) = state.bootstrap.error() {
        return Err(ApiError::Unavailable(kind));
    }

    let ack = match state.session.select(selection).await {
        Selected::Issued(tag) => {
            let ack = SelectionAck {
                status: SelectionStatus::Loading,
                fingerprint: Some(tag.fingerprint),
                seq: Some(tag.seq),
            };
            return Ok((StatusCode::ACCEPTED, Json(ack)));
        }
        Selected::Unchanged => SelectionAck { status: SelectionStatus::Unchanged, fingerprint: None, seq: None },
        Selected::Idle => SelectionAck { status: SelectionStatus::Idle, fingerprint: None, seq: None },
    };
    Ok((StatusCode::OK, Json(ack)))
}

/// PUT /api/weights: replace the metric weights (`null` → uniform)
pub async fn put_weights(
    State(state): State<SharedState>,
    Json(weights): Json<Option<BTreeMap<String, f64>>>,
) -> Result<Json<WeightsAck>, ApiError> {
    let weights = weights.map(WeightVector::new).transpose()?;
    if let Some(w) = &weights {
        info!(metrics = w.iter().count(), "Custom weights received");
    }
    let rebuilt = state.session.reweight(weights).await;
    Ok(Json(WeightsAck { rebuilt }))
}

/// GET /api/view: current view model
pub async fn get_view(State(state): State<SharedState>) -> Json<DashboardView> {
    Json(state.session.view().await)
}
