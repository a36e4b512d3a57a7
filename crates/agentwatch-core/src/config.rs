//! # Agentwatch Configuration
//!
//! Where the monitoring service lives and how to reach it.
//! Supports loading from environment variables and programmatic defaults.

use crate::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Default service address when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// The four remote operations the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Monitor,
    Logs,
    Capture,
    Audit,
}

/// Path of each endpoint relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPaths {
    pub monitor: String,
    pub logs: String,
    pub capture: String,
    pub audit: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            monitor: "/monitor".to_string(),
            logs: "/get-logs".to_string(),
            capture: "/capture-input".to_string(),
            audit: "/reason".to_string(),
        }
    }
}

impl EndpointPaths {
    /// Path configured for `endpoint`.
    pub fn get(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Monitor => &self.monitor,
            Endpoint::Logs => &self.logs,
            Endpoint::Capture => &self.capture,
            Endpoint::Audit => &self.audit,
        }
    }
}

/// Connection settings handed to the controller at construction.
///
/// # Example
/// ```rust
/// use agentwatch_core::{DashboardConfig, config::Endpoint};
///
/// let config = DashboardConfig::default()
///     .with_base_url("http://localhost:9000/")
///     .with_timeout(5);
///
/// assert_eq!(config.endpoint(Endpoint::Logs), "http://localhost:9000/get-logs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Scheme and host of the monitoring service.
    /// Default: `http://127.0.0.1:8000`, Env: AGENTWATCH_BASE_URL
    pub base_url: String,

    /// Endpoint paths.
    /// Env: AGENTWATCH_MONITOR_PATH, AGENTWATCH_LOGS_PATH,
    /// AGENTWATCH_CAPTURE_PATH, AGENTWATCH_AUDIT_PATH
    pub paths: EndpointPaths,

    /// Request timeout in seconds.
    /// Default: 30, Env: AGENTWATCH_TIMEOUT=10
    pub timeout_seconds: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            paths: EndpointPaths::default(),
            timeout_seconds: 30,
        }
    }
}

impl DashboardConfig {
    /// Create a config pointing at `base_url` with default paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Create a new config from environment variables.
    /// Falls back to defaults for missing or unparsable variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = env::var("AGENTWATCH_BASE_URL") {
            config.base_url = v;
        }
        if let Ok(v) = env::var("AGENTWATCH_TIMEOUT") {
            if let Ok(n) = v.parse() {
                config.timeout_seconds = n;
            }
        }
        if let Ok(v) = env::var("AGENTWATCH_MONITOR_PATH") {
            config.paths.monitor = v;
        }
        if let Ok(v) = env::var("AGENTWATCH_LOGS_PATH") {
            config.paths.logs = v;
        }
        if let Ok(v) = env::var("AGENTWATCH_CAPTURE_PATH") {
            config.paths.capture = v;
        }
        if let Ok(v) = env::var("AGENTWATCH_AUDIT_PATH") {
            config.paths.audit = v;
        }

        config
    }

    /// Builder: Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder: Set the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Builder: Replace the endpoint paths.
    pub fn with_paths(mut self, paths: EndpointPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Full URL for an endpoint, joined with exactly one `/`.
    pub fn endpoint(&self, endpoint: Endpoint) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.paths.get(endpoint).trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Reject configurations that cannot produce a usable client.
    pub fn validate(&self) -> Result<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(DashboardError::Config("base URL is empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(DashboardError::Config(format!(
                "base URL '{}' must start with http:// or https://",
                base
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(DashboardError::Config(
                "timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}
