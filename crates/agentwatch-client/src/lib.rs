//! # Agentwatch Client
//!
//! HTTP backend for the agentwatch dashboard.
//!
//! ## Example
//!
//! ```rust,ignore
//! use agentwatch_client::connect;
//! use agentwatch_core::DashboardConfig;
//!
//! // One-line initialization from environment
//! let controller = agentwatch_client::from_env()?;
//! controller.activate().await?;
//!
//! // Or point at a specific service
//! let controller = connect(DashboardConfig::new("http://localhost:8000"))?;
//! ```

pub mod http;
pub mod error;

pub use http::HttpMonitorApi;
pub use error::ClientError;

/// Re-export core types for convenience.
pub use agentwatch_core::{
    CaptureDraft, DashboardConfig, DashboardController, DashboardError, DashboardState,
    MonitorApi, Result, View,
};

/// Build a controller talking to the service described by `config`.
pub fn connect(config: DashboardConfig) -> Result<DashboardController<HttpMonitorApi>> {
    Ok(DashboardController::new(HttpMonitorApi::new(config)?))
}

/// Build a controller from `AGENTWATCH_*` environment variables.
pub fn from_env() -> Result<DashboardController<HttpMonitorApi>> {
    connect(DashboardConfig::from_env())
}
