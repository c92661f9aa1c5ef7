//! Async session driver.
//!
//! Wraps the orchestrator for a tokio host: each issued ticket becomes a
//! spawned fetch bounded by the request timeout. A newer selection aborts the
//! superseded task; the tag check in `complete` still guards any completion
//! that slips through. The orchestrator lock is never held across an await
//! on the backend.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info};
use uuid::Uuid;
use xaiboard_common::{ErrorKind, XaiboardError};
use xaiboard_ranker::{ScoringPolicy, WeightVector};

use crate::fingerprint::{Fingerprint, Selection};
use crate::orchestrator::{Completion, FetchTicket, RequestOrchestrator, RequestState, RequestTag};
use crate::source::ExperimentSource;
use crate::view::DashboardView;

/// Events pushed to subscribers on every state transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Idle,
    Loading { fingerprint: Fingerprint, seq: u64 },
    Ready { fingerprint: Fingerprint, seq: u64, inputs: usize },
    Failed { fingerprint: Fingerprint, seq: u64, error: ErrorKind },
    StaleDiscarded { fingerprint: Fingerprint, seq: u64 },
    Reweighted { rebuilt: bool },
}

/// Result of a selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selected {
    /// Input or explainer set empty; results cleared.
    Idle,
    /// Same selection already loading or shown.
    Unchanged,
    Issued(RequestTag),
}

struct Inner {
    orchestrator: RequestOrchestrator,
    in_flight: Option<(u64, AbortHandle)>,
}

pub struct Session {
    id: Uuid,
    inner: Arc<Mutex<Inner>>,
    source: Arc<dyn ExperimentSource>,
    request_timeout: Duration,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(source: Arc<dyn ExperimentSource>, policy: ScoringPolicy, request_timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            id: Uuid::new_v4(),
            inner: Arc::new(Mutex::new(Inner {
                orchestrator: RequestOrchestrator::new(policy),
                in_flight: None,
            })),
            source,
            request_timeout,
            events,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> DashboardView {
        self.inner.lock().await.orchestrator.view()
    }

    /// Apply a selection change, issuing a fetch when needed.
    pub async fn select(&self, selection: Selection) -> Selected {
        let mut inner = self.inner.lock().await;
        let ticket = inner.orchestrator.select(selection);

        let Some(ticket) = ticket else {
            if matches!(inner.orchestrator.state(), RequestState::Idle) {
                if let Some((seq, handle)) = inner.in_flight.take() {
                    debug!(session = %self.id, seq, "Aborting in-flight request");
                    handle.abort();
                }
                self.emit(SessionEvent::Idle);
                return Selected::Idle;
            }
            return Selected::Unchanged;
        };

        if let Some((seq, handle)) = inner.in_flight.take() {
            debug!(session = %self.id, seq, "Aborting superseded request");
            handle.abort();
        }

        let tag = ticket.tag.clone();
        self.emit(SessionEvent::Loading { fingerprint: tag.fingerprint.clone(), seq: tag.seq });

        let task = tokio::spawn(run_fetch(
            Arc::clone(&self.inner),
            Arc::clone(&self.source),
            self.events.clone(),
            self.request_timeout,
            ticket,
        ));
        inner.in_flight = Some((tag.seq, task.abort_handle()));

        Selected::Issued(tag)
    }

    /// Replace the weight vector; re-ranks shown results in place.
    pub async fn reweight(&self, weights: Option<WeightVector>) -> bool {
        let rebuilt = self.inner.lock().await.orchestrator.reweight(weights);
        info!(session = %self.id, rebuilt, "Weights updated");
        self.emit(SessionEvent::Reweighted { rebuilt });
        rebuilt
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

async fn run_fetch(
    inner: Arc<Mutex<Inner>>,
    source: Arc<dyn ExperimentSource>,
    events: broadcast::Sender<SessionEvent>,
    timeout: Duration,
    ticket: FetchTicket,
) {
    let outcome = match tokio::time::timeout(timeout, source.fetch_experiment(&ticket.request)).await {
        Ok(result) => result,
        Err(_) => Err(XaiboardError::Timeout(timeout)),
    };

    let mut guard = inner.lock().await;
    let completion = guard.orchestrator.complete(&ticket.tag, outcome);
    if matches!(guard.in_flight, Some((seq, _)) if seq == ticket.tag.seq) {
        guard.in_flight = None;
    }
    drop(guard);

    let RequestTag { fingerprint, seq } = ticket.tag;
    let event = match completion {
        Completion::Ready { inputs } => SessionEvent::Ready { fingerprint, seq, inputs },
        Completion::Failed(error) => SessionEvent::Failed { fingerprint, seq, error },
        Completion::Stale => SessionEvent::StaleDiscarded { fingerprint, seq },
    };
    let _ = events.send(event);
}
