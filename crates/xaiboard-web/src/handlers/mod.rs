//! HTTP handlers for all web routes.

pub mod experiment;
pub mod system;
