//! Scriptable in-memory explanation backend.
//!
//! Behaviour is scripted per input set (order-insensitive): a delay, a fetch
//! failure, a canned response, or an explainer to leave out. Unscripted
//! requests get a complete response from [`fixtures::response_for`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use xaiboard_common::wire::{ExperimentRequest, ExperimentResponse, ProjectsResponse};
use xaiboard_common::{ExplainerId, InputId, Result, XaiboardError};
use xaiboard_session::ExperimentSource;

use crate::fixtures;

#[derive(Debug, Clone, Default)]
struct Script {
    delay: Duration,
    failure: Option<String>,
    response: Option<ExperimentResponse>,
    omit: Option<ExplainerId>,
}

pub struct MockExperimentSource {
    scripts: HashMap<Vec<InputId>, Script>,
    projects: std::result::Result<ProjectsResponse, String>,
    projects_delay: Duration,
    experiment_calls: AtomicUsize,
    projects_calls: AtomicUsize,
    requests: Mutex<Vec<ExperimentRequest>>,
}

fn key(inputs: impl IntoIterator<Item = u64>) -> Vec<InputId> {
    let mut ids: Vec<InputId> = inputs.into_iter().map(InputId).collect();
    ids.sort();
    ids.dedup();
    ids
}

impl MockExperimentSource {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            projects: Ok(fixtures::sample_projects()),
            projects_delay: Duration::ZERO,
            experiment_calls: AtomicUsize::new(0),
            projects_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn script(&mut self, inputs: impl IntoIterator<Item = u64>) -> &mut Script {
        self.scripts.entry(key(inputs)).or_default()
    }

    /// Delay responses for this input set.
    pub fn with_delay(mut self, inputs: impl IntoIterator<Item = u64>, delay: Duration) -> Self {
        self.script(inputs).delay = delay;
        self
    }

    /// Fail requests for this input set with a fetch error.
    pub fn with_fetch_error(mut self, inputs: impl IntoIterator<Item = u64>, message: &str) -> Self {
        self.script(inputs).failure = Some(message.to_string());
        self
    }

    /// Answer requests for this input set with a fixed response.
    pub fn with_response(mut self, inputs: impl IntoIterator<Item = u64>, response: ExperimentResponse) -> Self {
        self.script(inputs).response = Some(response);
        self
    }

    /// Leave one explainer out of every input in the generated response.
    pub fn omitting(mut self, inputs: impl IntoIterator<Item = u64>, explainer: ExplainerId) -> Self {
        self.script(inputs).omit = Some(explainer);
        self
    }

    pub fn with_projects(mut self, projects: ProjectsResponse) -> Self {
        self.projects = Ok(projects);
        self
    }

    pub fn with_projects_error(mut self, message: &str) -> Self {
        self.projects = Err(message.to_string());
        self
    }

    pub fn with_projects_delay(mut self, delay: Duration) -> Self {
        self.projects_delay = delay;
        self
    }

    pub fn experiment_calls(&self) -> usize {
        self.experiment_calls.load(Ordering::SeqCst)
    }

    pub fn projects_calls(&self) -> usize {
        self.projects_calls.load(Ordering::SeqCst)
    }

    /// Every experiment request received, in arrival order.
    pub fn requests(&self) -> Vec<ExperimentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockExperimentSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExperimentSource for MockExperimentSource {
    async fn fetch_experiment(&self, request: &ExperimentRequest) -> Result<ExperimentResponse> {
        self.experiment_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let script = self
            .scripts
            .get(&key(request.input_ids.iter().map(|id| id.0)))
            .cloned()
            .unwrap_or_default();

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        if let Some(message) = script.failure {
            return Err(XaiboardError::Fetch(message));
        }

        let mut response = script.response.unwrap_or_else(|| fixtures::response_for(request));
        if let Some(explainer) = script.omit {
            for input in &mut response.inputs {
                input.explanations.retain(|e| e.explainer_id != explainer);
            }
        }
        Ok(response)
    }

    async fn fetch_projects(&self) -> Result<ProjectsResponse> {
        self.projects_calls.fetch_add(1, Ordering::SeqCst);
        if !self.projects_delay.is_zero() {
            tokio::time::sleep(self.projects_delay).await;
        }
        self.projects.clone().map_err(XaiboardError::Fetch)
    }
}
