//! Trait for explanation backend access.
//!
//! Provides an abstraction over the explanation-generation service so the
//! session logic can be driven by the HTTP client in production and by
//! scripted sources in tests.

use async_trait::async_trait;
use tracing::{debug, instrument};
use xaiboard_common::config::BackendConfig;
use xaiboard_common::wire::{ExperimentRequest, ExperimentResponse, ProjectsResponse};
use xaiboard_common::{Result, XaiboardError};

#[async_trait]
pub trait ExperimentSource: Send + Sync {
    /// Run (or fetch cached) explanations and evaluations for a selection.
    async fn fetch_experiment(&self, request: &ExperimentRequest) -> Result<ExperimentResponse>;

    /// List available projects and their experiments.
    async fn fetch_projects(&self) -> Result<ProjectsResponse>;
}

// ── HTTP implementation ──────────────────────────────────────────────────────

pub struct HttpExperimentSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpExperimentSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client: reqwest::Client::new() }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn experiment_url(&self, request: &ExperimentRequest) -> String {
        format!(
            "{}/projects/{}/experiments/{}/run",
            self.base_url, request.project_id, request.experiment_id
        )
    }

    async fn read_json<T: serde::de::DeserializeOwned>(url: &str, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(XaiboardError::Fetch(format!("{url} returned HTTP {status}")));
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ExperimentSource for HttpExperimentSource {
    #[instrument(skip(self, request), fields(project = %request.project_id, experiment = %request.experiment_id))]
    async fn fetch_experiment(&self, request: &ExperimentRequest) -> Result<ExperimentResponse> {
        let url = self.experiment_url(request);
        debug!(inputs = request.input_ids.len(), explainers = request.explainer_ids.len(), "POST {}", url);
        let body = serde_json::json!({
            "inputIds": request.input_ids,
            "explainerIds": request.explainer_ids,
        });
        let resp = self.client.post(&url).json(&body).send().await?;
        Self::read_json(&url, resp).await
    }

    #[instrument(skip(self))]
    async fn fetch_projects(&self) -> Result<ProjectsResponse> {
        let url = format!("{}/projects", self.base_url);
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await?;
        Self::read_json(&url, resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xaiboard_common::{ExplainerId, InputId};

    #[test]
    fn test_experiment_url() {
        let source = HttpExperimentSource::new("http://localhost:8000/api/");
        assert_eq!(source.base_url(), "http://localhost:8000/api");
        let req = ExperimentRequest {
            project_id: "imagenet".into(),
            experiment_id: "resnet18".into(),
            input_ids: vec![InputId(1)],
            explainer_ids: vec![ExplainerId(2)],
        };
        assert_eq!(
            source.experiment_url(&req),
            "http://localhost:8000/api/projects/imagenet/experiments/resnet18/run"
        );
    }
}
