//! xaiboard-web: HTTP surface of the explainability dashboard.
//!   - Selection and weight endpoints driving the session
//!   - Ranked view model
//!   - SSE stream of session and bootstrap events
//!   - Unavailable page after a failed bootstrap

pub mod router;
pub mod handlers;
pub mod state;
pub mod sse;
pub mod error;
