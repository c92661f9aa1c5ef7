//! Process-wide bootstrap state.
//!
//! Set exactly once, by [`BootstrapState::run`], to either the loaded project
//! list or an error kind. Never reset. On error the application navigates
//! once to the unavailable view; [`BootstrapState::take_redirect`] yields
//! `true` a single time to drive that.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{error, info, warn};
use xaiboard_common::wire::ProjectSummary;
use xaiboard_common::ErrorKind;

use crate::source::ExperimentSource;

static GLOBAL: OnceLock<BootstrapState> = OnceLock::new();

/// The process-wide instance.
pub fn global() -> &'static BootstrapState {
    GLOBAL.get_or_init(BootstrapState::new)
}

#[derive(Debug)]
enum Outcome {
    Loaded(Vec<ProjectSummary>),
    Failed(ErrorKind),
}

/// Serializable snapshot of the bootstrap state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BootstrapStatus {
    pub loaded: bool,
    pub error: Option<ErrorKind>,
}

#[derive(Debug, Default)]
pub struct BootstrapState {
    outcome: OnceLock<Outcome>,
    redirect_taken: AtomicBool,
}

impl BootstrapState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Perform the bootstrap fetch and record its outcome.
    /// A second call does not fetch again.
    pub async fn run(&self, source: &dyn ExperimentSource, timeout: Duration) -> BootstrapStatus {
        if self.is_resolved() {
            warn!("Bootstrap already resolved; ignoring repeated run");
            return self.status();
        }

        let outcome = match tokio::time::timeout(timeout, source.fetch_projects()).await {
            Ok(Ok(resp)) => {
                info!(projects = resp.projects.len(), "Bootstrap data loaded");
                Outcome::Loaded(resp.projects)
            }
            Ok(Err(e)) => {
                error!(error = %e, "Bootstrap fetch failed");
                Outcome::Failed(e.kind())
            }
            Err(_) => {
                error!(?timeout, "Bootstrap fetch timed out");
                Outcome::Failed(ErrorKind::Timeout)
            }
        };
        self.resolve(outcome);
        self.status()
    }

    /// Returns false (and keeps the first value) if already resolved.
    fn resolve(&self, outcome: Outcome) -> bool {
        match self.outcome.set(outcome) {
            Ok(()) => true,
            Err(ignored) => {
                warn!(?ignored, "Bootstrap state is one-shot; later outcome ignored");
                false
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.get().is_some()
    }

    pub fn loaded(&self) -> bool {
        matches!(self.outcome.get(), Some(Outcome::Loaded(_)))
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self.outcome.get() {
            Some(Outcome::Failed(kind)) => Some(*kind),
            _ => None,
        }
    }

    pub fn projects(&self) -> Option<&[ProjectSummary]> {
        match self.outcome.get() {
            Some(Outcome::Loaded(projects)) => Some(projects.as_slice()),
            _ => None,
        }
    }

    pub fn status(&self) -> BootstrapStatus {
        BootstrapStatus { loaded: self.loaded(), error: self.error() }
    }

    /// `true` exactly once after a bootstrap error, however often observed.
    pub fn take_redirect(&self) -> bool {
        self.error().is_some() && !self.redirect_taken.swap(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use xaiboard_common::wire::{ExperimentRequest, ExperimentResponse, ProjectsResponse};
    use xaiboard_common::{Result, XaiboardError};

    struct CountingSource {
        fail: bool,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self { fail, delay: Duration::ZERO, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl ExperimentSource for CountingSource {
        async fn fetch_experiment(&self, _request: &ExperimentRequest) -> Result<ExperimentResponse> {
            Ok(ExperimentResponse::default())
        }

        async fn fetch_projects(&self) -> Result<ProjectsResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                Err(XaiboardError::Fetch("connection refused".into()))
            } else {
                Ok(ProjectsResponse::default())
            }
        }
    }

    #[tokio::test]
    async fn test_loaded_once() {
        let state = BootstrapState::new();
        let source = CountingSource::new(false);
        let status = state.run(&source, Duration::from_secs(1)).await;
        assert_eq!(status, BootstrapStatus { loaded: true, error: None });
        state.run(&source, Duration::from_secs(1)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(!state.take_redirect());
    }

    #[tokio::test]
    async fn test_error_redirects_exactly_once() {
        let state = BootstrapState::new();
        let source = CountingSource::new(true);
        state.run(&source, Duration::from_secs(1)).await;
        assert_eq!(state.error(), Some(ErrorKind::FetchError));
        assert!(!state.loaded());

        let fired = (0..5).filter(|_| state.take_redirect()).count();
        assert_eq!(fired, 1);
        assert_eq!(state.error(), Some(ErrorKind::FetchError));
    }

    #[tokio::test]
    async fn test_timeout() {
        let state = BootstrapState::new();
        let source = CountingSource { delay: Duration::from_millis(200), ..CountingSource::new(false) };
        let status = state.run(&source, Duration::from_millis(10)).await;
        assert_eq!(status.error, Some(ErrorKind::Timeout));
    }

    #[test]
    fn test_later_outcome_ignored() {
        let state = BootstrapState::new();
        assert!(state.resolve(Outcome::Failed(ErrorKind::FetchError)));
        assert!(!state.resolve(Outcome::Loaded(vec![])));
        assert_eq!(state.status(), BootstrapStatus { loaded: false, error: Some(ErrorKind::FetchError) });
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(global(), global()));
    }
}
