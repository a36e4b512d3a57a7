use agentwatch_client::{connect, HttpMonitorApi};
use agentwatch_core::{view, CaptureDraft, DashboardConfig, DashboardController};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::{debug, info, warn};
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the monitoring service (overrides AGENTWATCH_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds (overrides AGENTWATCH_TIMEOUT)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show aggregate statistics
    Stats,

    /// Show captured logs
    Logs {
        /// Only show logs for this agent
        #[arg(short, long)]
        agent: Option<String>,
    },

    /// List agents seen in the logs
    Agents,

    /// Record one agent interaction
    Capture {
        /// Agent name
        #[arg(short, long)]
        agent: String,

        /// What the user sent
        #[arg(short, long)]
        input: String,

        /// What the agent answered
        #[arg(short, long)]
        output: String,
    },

    /// Summarize an agent's recent interactions
    Audit {
        /// Agent to audit
        #[arg(short, long)]
        agent: String,
    },

    /// Load everything and print the full dashboard
    Dashboard {
        /// Also run an audit for this agent
        #[arg(long)]
        audit: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();

    let mut config = DashboardConfig::from_env();
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(seconds) = cli.timeout {
        config = config.with_timeout(seconds);
    }
    debug!("Using monitoring service at {}", config.base_url);

    let controller = connect(config).context("Invalid dashboard configuration")?;

    match &cli.command {
        Commands::Stats => {
            controller.load_monitor().await.context("Failed to load statistics")?;
            let state = controller.state();
            if cli.json {
                print_json(&state.monitor)?;
            } else if let Some(snapshot) = &state.monitor {
                println!("Total Logs: {}", snapshot.total_logs);
                println!("Empty Inputs Found: {}", snapshot.empty_inputs_found);
                println!("Agents Active: {}", snapshot.agents_active());
                for (agent, count) in &snapshot.logs_per_agent {
                    println!("  {}: {} logs", agent, count);
                }
            }
        }
        Commands::Logs { agent } => {
            controller.load_logs().await.context("Failed to load logs")?;
            let logs: Vec<_> = controller
                .state()
                .logs
                .into_iter()
                .filter(|l| agent.as_deref().map_or(true, |a| l.agent_name == a))
                .collect();
            if cli.json {
                print_json(&logs)?;
            } else {
                let mut out = String::new();
                view::render_logs(&logs, &mut out);
                print!("{}", out);
            }
        }
        Commands::Agents => {
            controller.load_logs().await.context("Failed to load logs")?;
            let agents = controller.state().agent_names();
            if cli.json {
                print_json(&agents)?;
            } else {
                for agent in agents {
                    println!("{}", agent);
                }
            }
        }
        Commands::Capture { agent, input, output } => {
            controller.navigate(agentwatch_core::View::Dashboard);
            controller.set_draft(CaptureDraft::new(agent, input, output));
            info!("Capturing interaction for agent {}", agent);
            let ack = controller.capture_log().await.context("Capture failed")?;
            debug!("Capture acknowledged: {}", ack);
            finish(&controller, cli.json)?;
        }
        Commands::Audit { agent } => {
            info!("Running audit for {} (this may take a while)", agent);
            let audit = controller.run_audit(agent).await.context("Audit failed")?;
            if cli.json {
                print_json(&audit)?;
            } else {
                println!("{}", audit.summary_text);
            }
        }
        Commands::Dashboard { audit } => {
            if let Err(e) = controller.activate().await {
                warn!("Dashboard loaded with errors: {}", e);
            }
            if let Some(agent) = audit {
                if let Err(e) = controller.run_audit(agent).await {
                    warn!("Audit failed: {}", e);
                }
            }
            finish(&controller, cli.json)?;
        }
    }

    Ok(())
}

/// Print the whole dashboard state.
fn finish(controller: &DashboardController<HttpMonitorApi>, json: bool) -> Result<()> {
    if json {
        print_json(&controller.state())
    } else {
        print!("{}", controller.render());
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_capture() {
        let cli = Cli::try_parse_from([
            "agentwatch", "--base-url", "http://svc:8000", "capture",
            "--agent", "Alpha", "--input", "ping", "--output", "pong",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://svc:8000"));
        match cli.command {
            Commands::Capture { agent, input, output } => {
                assert_eq!((agent.as_str(), input.as_str(), output.as_str()), ("Alpha", "ping", "pong"));
            }
            _ => panic!("expected capture"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["agentwatch", "dashboard", "--json", "--audit", "Beta"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Dashboard { audit: Some(ref a) } if a == "Beta"));
    }
}
