//! xaiboard-ranker: Explanation result aggregation and ranking engine.
//!
//! raw metric values → normalise → combine → rank → assemble

pub mod error;
pub mod normalise;
pub mod weights;
pub mod scorer;
pub mod ranking;
pub mod assembler;
pub mod pipeline;

pub use error::RankerError;
pub use pipeline::{build_results, ScoringPolicy};
pub use ranking::{rank, RankedEntry};
pub use weights::WeightVector;
