//! xaiboard-session: Request lifecycle for one dashboard session.
//!
//! - `orchestrator`: synchronous Idle/Loading/Ready/Failed state machine
//! - `driver`: tokio wrapper issuing fetches with timeout and cancellation
//! - `bootstrap`: process-wide one-shot reference-data state
//! - `source`: the explanation backend seam (trait + HTTP client)

pub mod fingerprint;
pub mod source;
pub mod orchestrator;
pub mod driver;
pub mod bootstrap;
pub mod view;

pub use bootstrap::{BootstrapState, BootstrapStatus};
pub use driver::{Selected, Session, SessionEvent};
pub use fingerprint::{Fingerprint, Selection};
pub use orchestrator::{Completion, RequestOrchestrator, RequestState, RequestTag};
pub use source::{ExperimentSource, HttpExperimentSource};
pub use view::DashboardView;
