//! Evaluation metric catalogue.
//!
//! Polarity is documented per metric, never inferred from the data. The
//! built-in table covers the default evaluation suite of the explanation
//! backend; configuration may add or override entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

impl Polarity {
    /// Map a raw value so that larger always means better.
    pub fn orient(self, raw: f64) -> f64 {
        match self {
            Polarity::HigherIsBetter => raw,
            Polarity::LowerIsBetter => -raw,
        }
    }
}

pub const ABPC: &str = "AbPC";
pub const MORF: &str = "MoRF";
pub const LERF: &str = "LeRF";
pub const MU_FIDELITY: &str = "MuFidelity";
pub const SENSITIVITY: &str = "Sensitivity";
pub const COMPLEXITY: &str = "Complexity";

/// Default evaluation suite, in display order.
pub const DEFAULT_METRICS: [&str; 6] = [ABPC, MORF, LERF, MU_FIDELITY, SENSITIVITY, COMPLEXITY];

/// Polarity of the built-in metrics.
pub fn builtin_polarity(name: &str) -> Option<Polarity> {
    match name {
        // area between perturbation curves: larger gap = more faithful
        ABPC => Some(Polarity::HigherIsBetter),
        // most-relevant-first removal: faster drop = better
        MORF => Some(Polarity::LowerIsBetter),
        LERF => Some(Polarity::HigherIsBetter),
        MU_FIDELITY => Some(Polarity::HigherIsBetter),
        SENSITIVITY => Some(Polarity::LowerIsBetter),
        COMPLEXITY => Some(Polarity::LowerIsBetter),
        _ => None,
    }
}

/// Built-in polarities plus configured overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricCatalog {
    #[serde(default)]
    overrides: BTreeMap<String, Polarity>,
}

impl MetricCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: BTreeMap<String, Polarity>) -> Self {
        Self { overrides }
    }

    pub fn with(mut self, name: &str, polarity: Polarity) -> Self {
        self.overrides.insert(name.to_string(), polarity);
        self
    }

    /// Polarity of a metric. Unknown metrics count as higher-is-better.
    pub fn polarity(&self, name: &str) -> Polarity {
        if let Some(p) = self.overrides.get(name) {
            return *p;
        }
        builtin_polarity(name).unwrap_or_else(|| {
            debug!(metric = name, "No documented polarity; assuming higher is better");
            Polarity::HigherIsBetter
        })
    }

    pub fn is_documented(&self, name: &str) -> bool {
        self.overrides.contains_key(name) || builtin_polarity(name).is_some()
    }
}
