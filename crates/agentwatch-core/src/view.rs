//! Plain-text rendering of [`DashboardState`].
//!
//! One renderer serves both views; every section is driven by the state
//! alone.

use crate::controller::{AuditStatus, DashboardState, View};
use crate::model::LogEntry;

const TITLE: &str = "AI Agent Monitoring Dashboard";
const SUBTITLE: &str = "Real-time insights from monitored AI agents";
const MAX_CELL: usize = 48;

/// Render the active view.
pub fn render(state: &DashboardState) -> String {
    let mut out = String::new();
    out.push_str(TITLE);
    out.push('\n');
    out.push_str(SUBTITLE);
    out.push_str("\n\n");

    match state.view {
        View::Landing => {
            out.push_str("Open the dashboard to load statistics and logs.\n");
        }
        View::Dashboard => {
            render_stats(state, &mut out);
            render_activity(state, &mut out);
            render_logs(&state.logs, &mut out);
            render_audit(state, &mut out);
        }
    }

    if !state.notices.is_empty() {
        out.push_str("\nNotices\n");
        for notice in state.notices.values() {
            out.push_str(&format!("  ! {}: {}\n", notice.operation, notice.message));
        }
    }

    out
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("== {} ==\n", title));
}

fn render_stats(state: &DashboardState, out: &mut String) {
    section(out, "Stats");
    match &state.monitor {
        Some(snapshot) => {
            out.push_str(&format!("Total Logs: {}\n", snapshot.total_logs));
            out.push_str(&format!("Empty Inputs Found: {}\n", snapshot.empty_inputs_found));
            out.push_str(&format!("Agents Active: {}\n", snapshot.agents_active()));
        }
        None => out.push_str("Statistics not loaded.\n"),
    }
    out.push('\n');
}

fn render_activity(state: &DashboardState, out: &mut String) {
    section(out, "Agent Activity");
    if let Some(snapshot) = &state.monitor {
        for (agent, count) in &snapshot.logs_per_agent {
            out.push_str(&format!("  {}: {} logs\n", agent, count));
        }
    }
    out.push('\n');
}

/// Render the log table with columns sized to their widest cell.
pub fn render_logs(logs: &[LogEntry], out: &mut String) {
    section(out, "Captured Logs");
    if logs.is_empty() {
        out.push_str("No logs captured yet.\n\n");
        return;
    }

    let header = ["Agent", "User Input", "Output", "Timestamp"];
    let rows: Vec<[String; 4]> = logs
        .iter()
        .map(|log| {
            [
                cell(&log.agent_name),
                cell(&log.user_input),
                cell(log.output().unwrap_or("-")),
                log.local_timestamp(),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(value.chars().count());
        }
    }

    let line = |cells: [&str; 4]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };

    out.push_str(&line(header));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("|-{}-|\n", rule.join("-|-")));
    for row in &rows {
        out.push_str(&line([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()]));
    }
    out.push('\n');
}

fn render_audit(state: &DashboardState, out: &mut String) {
    section(out, "Run Audit");
    let button = match state.audit_status {
        AuditStatus::Requesting { .. } => "[Running...]",
        _ => "[Generate Summary]",
    };
    out.push_str(button);
    out.push('\n');
    if let Some(audit) = &state.audit {
        out.push_str(&format!(
            "Audit Result ({}): {}\n",
            audit.agent_name, audit.summary_text
        ));
    }
}

/// Flatten newlines and clip long values so rows stay on one line.
fn cell(value: &str) -> String {
    let flat = value.replace(['\r', '\n'], " ");
    if flat.chars().count() <= MAX_CELL {
        return flat;
    }
    let clipped: String = flat.chars().take(MAX_CELL - 3).collect();
    format!("{}...", clipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Notice, Operation};
    use crate::error::ErrorKind;
    use crate::model::{AuditResult, MonitorSnapshot};
    use std::collections::BTreeMap;

    fn dashboard() -> DashboardState {
        DashboardState {
            view: View::Dashboard,
            ..DashboardState::default()
        }
    }

    fn entry(agent_output: Option<&str>, output: Option<&str>) -> LogEntry {
        LogEntry {
            agent_name: "Alpha".to_string(),
            user_input: "hello".to_string(),
            agent_output: agent_output.map(str::to_string),
            output: output.map(str::to_string),
            timestamp: "not a time".to_string(),
        }
    }

    #[test]
    fn test_landing_view() {
        let text = render(&DashboardState::default());
        assert!(text.contains("Open the dashboard"));
        assert!(!text.contains("== Stats =="));
    }

    #[test]
    fn test_agents_active_count() {
        let mut state = dashboard();
        state.monitor = Some(MonitorSnapshot {
            total_logs: 10,
            empty_inputs_found: 2,
            logs_per_agent: BTreeMap::from([("Alpha".to_string(), 6), ("Beta".to_string(), 4)]),
        });

        let text = render(&state);
        assert!(text.contains("Total Logs: 10"));
        assert!(text.contains("Empty Inputs Found: 2"));
        assert!(text.contains("Agents Active: 2"));
        assert!(text.contains("  Alpha: 6 logs"));
        assert!(text.contains("  Beta: 4 logs"));
    }

    #[test]
    fn test_agent_activity_is_sorted_by_name() {
        let mut state = dashboard();
        let snapshot: MonitorSnapshot = serde_json::from_str(
            r#"{"total_logs": 3, "empty_inputs_found": 0, "logs_per_agent": {"Zeta": 1, "Alpha": 2}}"#,
        )
        .unwrap();
        state.monitor = Some(snapshot);

        let text = render(&state);
        let alpha = text.find("  Alpha: 2 logs").unwrap();
        let zeta = text.find("  Zeta: 1 logs").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_output_column_prefers_agent_output() {
        let mut out = String::new();
        render_logs(&[entry(None, Some("hi"))], &mut out);
        assert!(out.contains("| hi "));

        let mut out = String::new();
        render_logs(&[entry(Some("x"), Some("y"))], &mut out);
        assert!(out.contains("| x "));
        assert!(!out.contains("| y "));
    }

    #[test]
    fn test_long_cells_are_clipped() {
        let long = "a".repeat(100);
        assert_eq!(cell(&long).chars().count(), MAX_CELL);
        assert_eq!(cell("two\nlines"), "two lines");
    }

    #[test]
    fn test_audit_section_and_notices() {
        let mut state = dashboard();
        state.audit_status = AuditStatus::Requesting { agent_name: "Alpha".to_string() };
        state.audit = Some(AuditResult {
            agent_name: "Alpha".to_string(),
            summary_text: "All good".to_string(),
        });
        state.notices.insert(
            Operation::LoadLogs,
            Notice {
                operation: Operation::LoadLogs,
                kind: ErrorKind::Transport,
                message: "Network error: refused".to_string(),
            },
        );

        let text = render(&state);
        assert!(text.contains("[Running...]"));
        assert!(text.contains("Audit Result (Alpha): All good"));
        assert!(text.contains("! load logs: Network error: refused"));
    }
}
