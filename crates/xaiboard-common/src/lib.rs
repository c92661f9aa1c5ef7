//! xaiboard-common: Shared ids, domain model, wire contract, errors and
//! configuration used across all xaiboard crates.

pub mod error;
pub mod ids;
pub mod model;
pub mod wire;
pub mod metrics;
pub mod config;

// Re-export commonly used types
pub use error::{ErrorKind, Result, XaiboardError};
pub use ids::{ExperimentId, ExplainerId, InputId, ProjectId};
pub use metrics::{MetricCatalog, Polarity};
pub use config::{DashboardConfig, ScoringConfig};
