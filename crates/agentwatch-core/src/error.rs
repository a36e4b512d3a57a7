//! Error types for Agentwatch Core.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Agentwatch operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Main error type for the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The request never produced a response (connect, timeout, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The monitoring service answered with a non-success status.
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A required field was empty; no request was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An audit is already running for this controller.
    #[error("An audit is already in progress")]
    AuditInProgress,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which required field failed local validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("agent name must not be empty")]
    AgentName,
    #[error("user input must not be empty")]
    UserInput,
    #[error("agent output must not be empty")]
    AgentOutput,
}

/// Coarse classification of a [`DashboardError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Status,
    Decode,
    Validation,
    Busy,
    Config,
}

impl DashboardError {
    /// Classify the error for display and tests.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::Network(_) => ErrorKind::Transport,
            DashboardError::Status { .. } => ErrorKind::Status,
            DashboardError::Decode(_) | DashboardError::Json(_) => ErrorKind::Decode,
            DashboardError::Validation(_) => ErrorKind::Validation,
            DashboardError::AuditInProgress => ErrorKind::Busy,
            DashboardError::Config(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = DashboardError::Status { status: 502, body: "bad gateway".into() };
        assert_eq!(err.kind(), ErrorKind::Status);
        assert_eq!(err.to_string(), "Service returned 502: bad gateway");

        let err: DashboardError = ValidationError::UserInput.into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(DashboardError::from(json_err).kind(), ErrorKind::Decode);
    }
}
