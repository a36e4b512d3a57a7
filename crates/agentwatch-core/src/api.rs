//! Monitoring service trait and an in-memory implementation.
//!
//! Defines the interface the controller uses to reach the remote service.

use crate::config::Endpoint;
use crate::model::{
    AuditRequest, AuditResponse, CaptureRequest, LogEntry, MonitorSnapshot,
};
use crate::{DashboardError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// Acknowledgement returned by the capture endpoint. Its shape is up to the
/// service, so it is kept as raw JSON.
pub type CaptureAck = serde_json::Value;

/// Trait that monitoring service backends must implement.
///
/// Implementations report every failure as a [`DashboardError`] and never
/// panic on bad input from the service.
#[async_trait]
pub trait MonitorApi: Send + Sync {
    /// Get the backend name.
    fn name(&self) -> &str;

    /// Fetch aggregate statistics.
    async fn fetch_monitor(&self) -> Result<MonitorSnapshot>;

    /// Fetch the full log list.
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>>;

    /// Record one interaction.
    async fn capture(&self, request: CaptureRequest) -> Result<CaptureAck>;

    /// Ask the service to summarize one agent's recent interactions.
    async fn audit(&self, request: AuditRequest) -> Result<AuditResponse>;
}

#[async_trait]
impl<T: MonitorApi + ?Sized> MonitorApi for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_monitor(&self) -> Result<MonitorSnapshot> {
        (**self).fetch_monitor().await
    }

    async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        (**self).fetch_logs().await
    }

    async fn capture(&self, request: CaptureRequest) -> Result<CaptureAck> {
        (**self).capture(request).await
    }

    async fn audit(&self, request: AuditRequest) -> Result<AuditResponse> {
        (**self).audit(request).await
    }
}

/// Failure a [`MockApi`] can be told to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    Network,
    Status(u16),
    Decode,
}

impl MockFailure {
    fn to_error(&self) -> DashboardError {
        match self {
            MockFailure::Network => DashboardError::Network("connection refused".to_string()),
            MockFailure::Status(status) => DashboardError::Status {
                status: *status,
                body: "mock failure".to_string(),
            },
            MockFailure::Decode => DashboardError::Decode("unexpected body".to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    logs: Vec<LogEntry>,
    snapshot: Option<MonitorSnapshot>,
    summaries: HashMap<String, String>,
    failures: HashMap<Endpoint, MockFailure>,
    captured: Vec<CaptureRequest>,
}

/// A mock monitoring service for testing.
///
/// Keeps logs in memory and derives statistics from them unless a fixed
/// snapshot is set. Counts calls per endpoint.
#[derive(Debug, Default)]
pub struct MockApi {
    state: Mutex<MockState>,
    calls: [AtomicUsize; 4],
    audit_gate: Option<Arc<Notify>>,
}

fn slot(endpoint: Endpoint) -> usize {
    match endpoint {
        Endpoint::Monitor => 0,
        Endpoint::Logs => 1,
        Endpoint::Capture => 2,
        Endpoint::Audit => 3,
    }
}

impl MockApi {
    /// Create a new mock service with no logs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a log entry.
    pub fn with_log(self, entry: LogEntry) -> Self {
        self.lock().logs.push(entry);
        self
    }

    /// Always return `snapshot` from the monitor endpoint.
    pub fn with_snapshot(self, snapshot: MonitorSnapshot) -> Self {
        self.lock().snapshot = Some(snapshot);
        self
    }

    /// Summary returned when auditing `agent`.
    pub fn with_summary(self, agent: impl Into<String>, summary: impl Into<String>) -> Self {
        self.lock().summaries.insert(agent.into(), summary.into());
        self
    }

    /// Hold every audit until `gate` is notified.
    pub fn with_audit_gate(mut self, gate: Arc<Notify>) -> Self {
        self.audit_gate = Some(gate);
        self
    }

    /// Make `endpoint` fail until [`MockApi::recover`] is called.
    pub fn fail(&self, endpoint: Endpoint, failure: MockFailure) {
        self.lock().failures.insert(endpoint, failure);
    }

    /// Let `endpoint` succeed again.
    pub fn recover(&self, endpoint: Endpoint) {
        self.lock().failures.remove(&endpoint);
    }

    /// Number of calls made to `endpoint`, failed ones included.
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls[slot(endpoint)].load(Ordering::SeqCst)
    }

    /// Total calls across all endpoints.
    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Every capture request accepted so far.
    pub fn captured(&self) -> Vec<CaptureRequest> {
        self.lock().captured.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter(&self, endpoint: Endpoint) -> Result<()> {
        self.calls[slot(endpoint)].fetch_add(1, Ordering::SeqCst);
        match self.lock().failures.get(&endpoint) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MonitorApi for MockApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_monitor(&self) -> Result<MonitorSnapshot> {
        self.enter(Endpoint::Monitor)?;
        let state = self.lock();
        if let Some(snapshot) = &state.snapshot {
            return Ok(snapshot.clone());
        }

        let mut logs_per_agent = BTreeMap::new();
        for entry in &state.logs {
            *logs_per_agent.entry(entry.agent_name.clone()).or_insert(0) += 1;
        }
        Ok(MonitorSnapshot {
            total_logs: state.logs.len() as u64,
            empty_inputs_found: state
                .logs
                .iter()
                .filter(|l| l.user_input.trim().is_empty())
                .count() as u64,
            logs_per_agent,
        })
    }

    async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        self.enter(Endpoint::Logs)?;
        Ok(self.lock().logs.clone())
    }

    async fn capture(&self, request: CaptureRequest) -> Result<CaptureAck> {
        self.enter(Endpoint::Capture)?;
        let mut state = self.lock();
        state.logs.push(LogEntry {
            agent_name: request.agent_name.clone(),
            user_input: request.user_input.clone(),
            agent_output: Some(request.agent_output.clone()),
            output: None,
            timestamp: request.timestamp.clone(),
        });
        state.captured.push(request);
        Ok(serde_json::json!({ "status": "ok" }))
    }

    async fn audit(&self, request: AuditRequest) -> Result<AuditResponse> {
        self.enter(Endpoint::Audit)?;
        if let Some(gate) = &self.audit_gate {
            gate.notified().await;
        }
        // Failures set while the gate was closed still apply.
        if let Some(failure) = self.lock().failures.get(&Endpoint::Audit) {
            return Err(failure.to_error());
        }
        let summary = self.lock().summaries.get(&request.agent_name).cloned();
        Ok(AuditResponse { summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CaptureDraft;
    use chrono::Utc;

    #[tokio::test]
    async fn test_mock_derives_statistics() {
        let api = MockApi::new();
        api.capture(CaptureDraft::new("Alpha", "hi", "hello").to_request(Utc::now()))
            .await
            .unwrap();
        api.capture(CaptureDraft::new("Beta", " ", "hello").to_request(Utc::now()))
            .await
            .unwrap();

        let snapshot = api.fetch_monitor().await.unwrap();
        assert_eq!(snapshot.total_logs, 2);
        assert_eq!(snapshot.empty_inputs_found, 1);
        assert_eq!(snapshot.agents_active(), 2);
        assert_eq!(api.calls(Endpoint::Capture), 2);
    }

    #[tokio::test]
    async fn test_mock_failure_and_recovery() {
        let api = MockApi::new();
        api.fail(Endpoint::Logs, MockFailure::Status(503));
        let err = api.fetch_logs().await.unwrap_err();
        assert!(matches!(err, DashboardError::Status { status: 503, .. }));

        api.recover(Endpoint::Logs);
        assert!(api.fetch_logs().await.unwrap().is_empty());
        assert_eq!(api.calls(Endpoint::Logs), 2);
    }
}
