//! Wire and state types shared by the controller and the HTTP client.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate statistics returned by the monitor endpoint.
///
/// Replaced wholesale on every refresh; never edited locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub total_logs: u64,
    pub empty_inputs_found: u64,
    #[serde(default)]
    pub logs_per_agent: BTreeMap<String, u64>,
}

impl MonitorSnapshot {
    /// Number of agents the service reports activity for.
    pub fn agents_active(&self) -> usize {
        self.logs_per_agent.len()
    }
}

/// One captured interaction.
///
/// Older backends store the response under `output`, newer ones under
/// `agent_output`. Both are kept so [`LogEntry::output`] can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub agent_name: String,
    pub user_input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub timestamp: String,
}

impl LogEntry {
    /// The recorded response, preferring `agent_output` over `output`.
    pub fn output(&self) -> Option<&str> {
        self.agent_output.as_deref().or(self.output.as_deref())
    }

    /// Timestamp in the operator's local time zone.
    ///
    /// Unparsable timestamps are returned verbatim.
    pub fn local_timestamp(&self) -> String {
        match DateTime::parse_from_rfc3339(&self.timestamp) {
            Ok(ts) => ts
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            Err(_) => self.timestamp.clone(),
        }
    }
}

/// Body of the logs endpoint. A missing `logs` key means no logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogList {
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

/// Distinct agent names across `logs`.
pub fn agent_names(logs: &[LogEntry]) -> BTreeSet<String> {
    logs.iter().map(|l| l.agent_name.clone()).collect()
}

/// Operator-owned capture form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDraft {
    pub agent_name: String,
    pub user_input: String,
    pub agent_output: String,
}

impl CaptureDraft {
    pub fn new(
        agent_name: impl Into<String>,
        user_input: impl Into<String>,
        agent_output: impl Into<String>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            user_input: user_input.into(),
            agent_output: agent_output.into(),
        }
    }

    /// Check that every field has non-whitespace content.
    pub fn validate(&self) -> std::result::Result<(), crate::ValidationError> {
        use crate::ValidationError;

        if self.agent_name.trim().is_empty() {
            return Err(ValidationError::AgentName);
        }
        if self.user_input.trim().is_empty() {
            return Err(ValidationError::UserInput);
        }
        if self.agent_output.trim().is_empty() {
            return Err(ValidationError::AgentOutput);
        }
        Ok(())
    }

    /// Whether every field is blank.
    pub fn is_empty(&self) -> bool {
        self.agent_name.is_empty() && self.user_input.is_empty() && self.agent_output.is_empty()
    }

    /// Freeze the draft into a request stamped with `at`.
    pub fn to_request(&self, at: DateTime<Utc>) -> CaptureRequest {
        CaptureRequest {
            agent_name: self.agent_name.clone(),
            user_input: self.user_input.clone(),
            agent_output: self.agent_output.clone(),
            timestamp: iso_timestamp(at),
        }
    }
}

/// Body of a capture request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub agent_name: String,
    pub user_input: String,
    pub agent_output: String,
    pub timestamp: String,
}

/// Body of an audit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRequest {
    pub agent_name: String,
}

/// Body of an audit response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditResponse {
    #[serde(default)]
    pub summary: Option<String>,
}

/// Text stored when the service answers without a summary.
pub const NO_SUMMARY: &str = "No summary returned.";

/// Audit summary for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    pub agent_name: String,
    pub summary_text: String,
}

impl AuditResult {
    pub fn from_response(agent_name: impl Into<String>, response: AuditResponse) -> Self {
        Self {
            agent_name: agent_name.into(),
            summary_text: response.summary.unwrap_or_else(|| NO_SUMMARY.to_string()),
        }
    }
}

/// ISO-8601 UTC with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
