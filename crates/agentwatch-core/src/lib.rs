//! # Agentwatch Core
//!
//! Client-side state and data flow for the agent monitoring dashboard.
//!
//! This crate provides the data model shared with the monitoring service,
//! the [`MonitorApi`] seam behind which the service sits, and the
//! [`DashboardController`] that keeps statistics, logs and audit results
//! consistent after every mutation.
//!
//! ## Features
//!
//! - Concurrent loading of statistics and logs
//! - Validated log capture followed by an ordered refresh
//! - Single-flight audits
//! - Plain-text rendering of the dashboard
//!
//! ## Example
//!
//! ```rust,ignore
//! use agentwatch_core::{DashboardController, MockApi};
//!
//! let controller = DashboardController::new(MockApi::new());
//! controller.activate().await?;
//! println!("{}", controller.render());
//! ```

pub mod error;
pub mod config;
pub mod model;
pub mod api;
pub mod controller;
pub mod view;

pub use error::{DashboardError, ErrorKind, Result, ValidationError};
pub use config::{DashboardConfig, Endpoint, EndpointPaths};
pub use model::{AuditResult, CaptureDraft, LogEntry, MonitorSnapshot};
pub use api::{MockApi, MonitorApi};
pub use controller::{AuditStatus, DashboardController, DashboardState, Notice, Operation, View};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        CaptureDraft, DashboardConfig, DashboardController, DashboardError, DashboardState,
        MonitorApi, Result, View,
    };
}
