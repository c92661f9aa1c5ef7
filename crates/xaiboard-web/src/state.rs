//! Shared application state for the web server.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};
use xaiboard_common::ErrorKind;
use xaiboard_session::{BootstrapState, ExperimentSource, Session, SessionEvent};

pub const UNAVAILABLE_PATH: &str = "/unavailable";

/// Bootstrap outcome as seen by connected clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BootstrapEvent {
    Loaded { projects: usize },
    /// Sent once; clients navigate to `location`.
    Unavailable { error: ErrorKind, location: &'static str },
}

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "channel", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    Session(SessionEvent),
    Bootstrap(BootstrapEvent),
}

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub bootstrap: &'static BootstrapState,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
}

impl AppState {
    /// Must be called inside a tokio runtime: spawns the task relaying
    /// session events onto `event_tx`.
    pub fn new(session: Arc<Session>, bootstrap: &'static BootstrapState) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        tokio::spawn(relay_session_events(session.subscribe(), event_tx.clone()));
        Self { session, bootstrap, event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    /// Run the one-shot bootstrap fetch and announce its outcome.
    ///
    /// GET / redirects for as long as the error stands; the `Unavailable`
    /// event only moves clients already listening on the event stream, so
    /// the one-shot is left in place while nobody is subscribed.
    pub async fn run_bootstrap(&self, source: &dyn ExperimentSource, timeout: Duration) {
        self.bootstrap.run(source, timeout).await;

        if let Some(projects) = self.bootstrap.projects() {
            let _ = self.event_tx.send(AppEvent::Bootstrap(BootstrapEvent::Loaded { projects: projects.len() }));
        }
        if let Some(error) = self.bootstrap.error() {
            if self.event_tx.receiver_count() > 0 && self.bootstrap.take_redirect() {
                warn!(?error, "Dashboard unavailable; redirecting clients");
                let _ = self.event_tx.send(AppEvent::Bootstrap(BootstrapEvent::Unavailable {
                    error,
                    location: UNAVAILABLE_PATH,
                }));
            }
        }
    }
}

async fn relay_session_events(
    mut rx: broadcast::Receiver<SessionEvent>,
    tx: broadcast::Sender<AppEvent>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                let _ = tx.send(AppEvent::Session(event));
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Session event relay lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("Session event channel closed");
                break;
            }
        }
    }
}

pub type SharedState = Arc<AppState>;
