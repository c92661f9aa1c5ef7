//! Configuration loading for xaiboard.
//! Reads xaiboard.toml from the current directory or the path in the
//! XAIBOARD_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::metrics::{MetricCatalog, Polarity};

pub const CONFIG_ENV: &str = "XAIBOARD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "xaiboard.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

// ── Server ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16    { 3001 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

// ── Explanation backend ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_bootstrap_timeout")]
    pub bootstrap_timeout_secs: u64,
}

fn default_base_url()          -> String { "http://127.0.0.1:8000/api".to_string() }
fn default_request_timeout()   -> u64    { 30 }
fn default_bootstrap_timeout() -> u64    { 10 }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            bootstrap_timeout_secs: default_bootstrap_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bootstrap_timeout(&self) -> Duration {
        Duration::from_secs(self.bootstrap_timeout_secs)
    }
}

// ── Scoring ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Metric weights; `None` means uniform over the metrics present.
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f64>>,
    /// Polarity overrides on top of the built-in metric table.
    #[serde(default)]
    pub polarity: BTreeMap<String, Polarity>,
    #[serde(default = "default_tie_epsilon")]
    pub tie_epsilon: f64,
}

fn default_tie_epsilon() -> f64 { 1e-9 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: None,
            polarity: BTreeMap::new(),
            tie_epsilon: default_tie_epsilon(),
        }
    }
}

impl ScoringConfig {
    pub fn catalog(&self) -> MetricCatalog {
        MetricCatalog::with_overrides(self.polarity.clone())
    }
}

mod tests;

impl DashboardConfig {
    /// Load configuration.
    /// Checks XAIBOARD_CONFIG first (must exist when set), then
    /// ./xaiboard.toml, falling back to defaults when neither is present.
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !Path::new(&path).exists() {
                anyhow::bail!("Config file not found: {} (set via {})", path, CONFIG_ENV);
            }
            return Self::from_file(&path);
        }

        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::from_file(DEFAULT_CONFIG_PATH);
        }

        tracing::info!("No {} found; using default configuration", DEFAULT_CONFIG_PATH);
        Ok(Self::default())
    }

    /// Load from a TOML or YAML file, chosen by extension.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = if path.ends_with(".yaml") || path.ends_with(".yml") {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(weights) = &self.scoring.weights {
            for (metric, w) in weights {
                if !w.is_finite() || *w < 0.0 {
                    anyhow::bail!("scoring.weights.{} must be a finite non-negative number, got {}", metric, w);
                }
            }
        }
        if !(self.scoring.tie_epsilon >= 0.0) {
            anyhow::bail!("scoring.tie_epsilon must be non-negative");
        }
        if self.backend.request_timeout_secs == 0 {
            anyhow::bail!("backend.request_timeout_secs must be positive");
        }
        if self.backend.bootstrap_timeout_secs == 0 {
            anyhow::bail!("backend.bootstrap_timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
