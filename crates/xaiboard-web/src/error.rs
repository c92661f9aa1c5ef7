//! API error type. Rendered as a JSON body with a matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use xaiboard_common::ErrorKind;
use xaiboard_ranker::RankerError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Reference data is still loading")]
    NotReady,

    #[error("{}", .0.message())]
    Unavailable(ErrorKind),

    #[error("Invalid weights: {0}")]
    InvalidWeights(#[from] RankerError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotReady | ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidWeights(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Unavailable(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (self.status(), Json(body)).into_response()
    }
}
