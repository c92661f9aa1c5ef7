//! xaiboard-test-utils: Fixtures and a scriptable explanation backend for
//! integration tests.

pub mod fixtures;
pub mod mock_source;

pub use mock_source::MockExperimentSource;
