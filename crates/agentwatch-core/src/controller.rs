//! Dashboard Controller - owns all client state and talks to the service.
//!
//! Every operation takes `&self`, so statistics and logs can be loaded
//! concurrently. State lives behind a lock that is never held across a
//! network call; each response settles into its own slice of state when it
//! arrives.

use crate::api::{CaptureAck, MonitorApi};
use crate::error::ErrorKind;
use crate::model::{
    agent_names, AuditRequest, AuditResult, CaptureDraft, LogEntry, MonitorSnapshot,
};
use crate::view;
use crate::{DashboardError, Result, ValidationError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument, warn};

/// Source of capture timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Landing,
    Dashboard,
}

/// The four networked operations, used to key error notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    LoadMonitor,
    LoadLogs,
    Capture,
    Audit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::LoadMonitor => "load statistics",
            Operation::LoadLogs => "load logs",
            Operation::Capture => "capture",
            Operation::Audit => "audit",
        };
        f.write_str(name)
    }
}

/// A recoverable error shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub operation: Operation,
    pub kind: ErrorKind,
    pub message: String,
}

/// Audit lifecycle. At most one audit is in flight per controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum AuditStatus {
    #[default]
    Idle,
    Requesting { agent_name: String },
    Succeeded,
    Failed,
}

/// Everything the dashboard displays.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardState {
    pub view: View,
    pub monitor: Option<MonitorSnapshot>,
    pub logs: Vec<LogEntry>,
    pub draft: CaptureDraft,
    pub audit_status: AuditStatus,
    pub audit: Option<AuditResult>,
    pub notices: BTreeMap<Operation, Notice>,
    #[serde(skip)]
    pub(crate) epoch: u64,
}

impl DashboardState {
    /// Distinct agent names in the current log list.
    pub fn agent_names(&self) -> BTreeSet<String> {
        agent_names(&self.logs)
    }

    /// Whether an audit request is in flight.
    pub fn is_auditing(&self) -> bool {
        matches!(self.audit_status, AuditStatus::Requesting { .. })
    }

    /// Outstanding error notice for `operation`.
    pub fn notice(&self, operation: Operation) -> Option<&Notice> {
        self.notices.get(&operation)
    }
}

/// Owns dashboard state and keeps it in sync with the monitoring service.
///
/// # Example
///
/// ```rust,ignore
/// use agentwatch_core::{DashboardController, CaptureDraft};
///
/// let controller = DashboardController::new(api);
/// controller.activate().await?;
///
/// controller.set_draft(CaptureDraft::new("Alpha", "ping", "pong"));
/// controller.capture_log().await?;
///
/// controller.run_audit("Alpha").await?;
/// println!("{}", controller.render());
/// ```
pub struct DashboardController<A: MonitorApi> {
    api: A,
    state: RwLock<DashboardState>,
    clock: Clock,
}

impl<A: MonitorApi> DashboardController<A> {
    /// Create a controller over `api`, starting on the landing view.
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: RwLock::new(DashboardState::default()),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the clock used to stamp captures.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The backend this controller talks to.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the current state.
    pub fn state(&self) -> DashboardState {
        self.read().clone()
    }

    /// Render the current view as text.
    pub fn render(&self) -> String {
        view::render(&self.read())
    }

    /// Current capture form contents.
    pub fn draft(&self) -> CaptureDraft {
        self.read().draft.clone()
    }

    /// Replace the capture form contents.
    pub fn set_draft(&self, draft: CaptureDraft) {
        self.write().draft = draft;
    }

    /// Edit the capture form in place.
    pub fn edit_draft(&self, edit: impl FnOnce(&mut CaptureDraft)) {
        edit(&mut self.write().draft);
    }

    /// Switch views. Leaving the dashboard drops the audit result, and any
    /// response still in flight is discarded when it lands.
    pub fn navigate(&self, view: View) {
        let mut state = self.write();
        if state.view == view {
            return;
        }
        if state.view == View::Dashboard {
            state.epoch += 1;
            state.audit = None;
            state.notices.remove(&Operation::Audit);
            if !state.is_auditing() {
                state.audit_status = AuditStatus::Idle;
            }
        }
        debug!(from = ?state.view, to = ?view, "navigate");
        state.view = view;
    }

    /// Open the dashboard and load statistics and logs concurrently.
    pub async fn activate(&self) -> Result<()> {
        self.navigate(View::Dashboard);
        self.refresh().await
    }

    /// Load statistics and logs concurrently. Both always run; the first
    /// failure is returned.
    pub async fn refresh(&self) -> Result<()> {
        let (monitor, logs) = futures::join!(self.load_monitor(), self.load_logs());
        monitor.and(logs)
    }

    /// Replace the statistics snapshot. On failure the previous snapshot stays.
    #[instrument(skip(self), fields(api = self.api.name()))]
    pub async fn load_monitor(&self) -> Result<()> {
        let epoch = self.epoch();
        let result = self.api.fetch_monitor().await;
        self.settle(Operation::LoadMonitor, epoch, result, |state, snapshot| {
            debug!(total_logs = snapshot.total_logs, "statistics loaded");
            state.monitor = Some(snapshot);
        })
    }

    /// Replace the log list. On failure the previous list stays.
    #[instrument(skip(self), fields(api = self.api.name()))]
    pub async fn load_logs(&self) -> Result<()> {
        let epoch = self.epoch();
        let result = self.api.fetch_logs().await;
        self.settle(Operation::LoadLogs, epoch, result, |state, logs| {
            debug!(count = logs.len(), "logs loaded");
            state.logs = logs;
        })
    }

    /// Submit the current draft, then reload logs and statistics.
    ///
    /// An invalid draft is rejected without a request. A failed submission
    /// keeps the draft so it can be retried as is. Refresh failures after a
    /// successful submission are recorded against their own operations.
    #[instrument(skip(self), fields(api = self.api.name()))]
    pub async fn capture_log(&self) -> Result<CaptureAck> {
        let (draft, epoch) = {
            let state = self.read();
            (state.draft.clone(), state.epoch)
        };

        if let Err(invalid) = draft.validate() {
            let err = DashboardError::from(invalid);
            self.record(Operation::Capture, &err);
            return Err(err);
        }

        let request = draft.to_request((self.clock)());
        info!(agent = %request.agent_name, timestamp = %request.timestamp, "capturing log");

        let ack = match self.api.capture(request).await {
            Ok(ack) => ack,
            Err(err) => {
                self.record(Operation::Capture, &err);
                return Err(err);
            }
        };

        {
            let mut state = self.write();
            state.notices.remove(&Operation::Capture);
            state.draft = CaptureDraft::default();
        }

        if self.epoch() == epoch {
            if let Err(err) = self.load_logs().await {
                debug!("log refresh after capture failed: {}", err);
            }
            if let Err(err) = self.load_monitor().await {
                debug!("statistics refresh after capture failed: {}", err);
            }
        }

        Ok(ack)
    }

    /// Ask the service for a summary of `agent_name`.
    ///
    /// Rejected with [`DashboardError::AuditInProgress`] while another audit
    /// is pending. On failure the previous summary stays.
    #[instrument(skip(self), fields(api = self.api.name()))]
    pub async fn run_audit(&self, agent_name: &str) -> Result<AuditResult> {
        let agent_name = agent_name.trim();
        if agent_name.is_empty() {
            let err = DashboardError::from(ValidationError::AgentName);
            self.record(Operation::Audit, &err);
            return Err(err);
        }

        let epoch = {
            let mut state = self.write();
            if state.is_auditing() {
                debug!("audit rejected, another is in flight");
                return Err(DashboardError::AuditInProgress);
            }
            state.audit_status = AuditStatus::Requesting {
                agent_name: agent_name.to_string(),
            };
            state.epoch
        };
        let _pending = PendingAudit { state: &self.state };

        let result = self
            .api
            .audit(AuditRequest {
                agent_name: agent_name.to_string(),
            })
            .await;

        let mut state = write_lock(&self.state);
        if state.epoch != epoch {
            debug!("discarding audit response for a view that was left");
            state.audit_status = AuditStatus::Idle;
            return result.map(|response| AuditResult::from_response(agent_name, response));
        }

        match result {
            Ok(response) => {
                let audit = AuditResult::from_response(agent_name, response);
                info!(agent = %agent_name, "audit complete");
                state.audit_status = AuditStatus::Succeeded;
                state.audit = Some(audit.clone());
                state.notices.remove(&Operation::Audit);
                Ok(audit)
            }
            Err(err) => {
                warn!(agent = %agent_name, "audit failed: {}", err);
                state.audit_status = AuditStatus::Failed;
                state.notices.insert(Operation::Audit, notice(Operation::Audit, &err));
                Err(err)
            }
        }
    }

    fn epoch(&self) -> u64 {
        self.read().epoch
    }

    fn read(&self) -> RwLockReadGuard<'_, DashboardState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, DashboardState> {
        write_lock(&self.state)
    }

    fn record(&self, operation: Operation, err: &DashboardError) {
        warn!("{} failed: {}", operation, err);
        self.write().notices.insert(operation, notice(operation, err));
    }

    /// Apply a finished read to state, unless the view it belongs to is gone.
    fn settle<T>(
        &self,
        operation: Operation,
        epoch: u64,
        result: Result<T>,
        apply: impl FnOnce(&mut DashboardState, T),
    ) -> Result<()> {
        let mut state = self.write();
        if state.epoch != epoch {
            debug!("discarding stale {} response", operation);
            return result.map(|_| ());
        }
        match result {
            Ok(value) => {
                apply(&mut *state, value);
                state.notices.remove(&operation);
                Ok(())
            }
            Err(err) => {
                warn!("{} failed: {}", operation, err);
                state.notices.insert(operation, notice(operation, &err));
                Err(err)
            }
        }
    }
}

fn write_lock(state: &RwLock<DashboardState>) -> RwLockWriteGuard<'_, DashboardState> {
    state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn notice(operation: Operation, err: &DashboardError) -> Notice {
    Notice {
        operation,
        kind: err.kind(),
        message: err.to_string(),
    }
}

/// Returns the audit to Idle if the request future is dropped mid-flight.
struct PendingAudit<'a> {
    state: &'a RwLock<DashboardState>,
}

impl Drop for PendingAudit<'_> {
    fn drop(&mut self) {
        let mut state = write_lock(self.state);
        if state.is_auditing() {
            state.audit_status = AuditStatus::Idle;
        }
    }
}
