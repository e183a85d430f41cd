//! CLA Gate - pull request CLA and signoff validation CLI
//!
//! ## Commands
//!
//! - `handle`: run one webhook payload through the validator
//! - `details`: print the audit record behind a status details link
//! - `lookup`: ask the CLA authority about one email or login

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cla_gate_core::{
    AuditRecorder, DispatchOutcome, EventDispatcher, EventKind, LogNotifier, Notifier,
    PipelineOutcome, ServiceConfig, SpoolNotifier, ValidationPipeline,
};
use cla_gate_forge::{ClaAuthority, ClaStatus, GitHubClient, HttpClaAuthority};
use cla_gate_state::AuditKey;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "cla-gate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate pull requests against CLA and signoff policy", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// TOML configuration file (CLA_GATE_* variables still override it)
    #[arg(short, long, global = true, env = "CLA_GATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one webhook payload
    Handle {
        /// Event kind, as sent in the X-GitHub-Event header
        #[arg(short, long, default_value = "pull_request")]
        event: String,

        /// File holding the JSON payload
        #[arg(short, long)]
        payload: PathBuf,
    },

    /// Print the stored classification for an audit key
    Details {
        /// Key from a status details link
        key: String,
    },

    /// Query the CLA authority for an email address or forge login
    Lookup { identity: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    cla_gate_core::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Handle { event, payload } => cmd_handle(config, &event, &payload).await,
        Commands::Details { key } => cmd_details(&config, &key).await,
        Commands::Lookup { identity } => cmd_lookup(&config, &identity).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let base = match path {
        Some(path) => ServiceConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => ServiceConfig::default(),
    };
    base.apply_env(|var| std::env::var(var).ok())
        .context("Invalid CLA_GATE_* environment override")
}

fn cla_authority(config: &ServiceConfig) -> Result<HttpClaAuthority> {
    HttpClaAuthority::new(&config.cla_service_url, config.call_timeout_secs)
        .context("Failed to build CLA authority client")
}

async fn cmd_handle(config: ServiceConfig, event: &str, payload: &Path) -> Result<()> {
    let body = std::fs::read(payload)
        .with_context(|| format!("Failed to read payload {:?}", payload))?;

    let forge = GitHubClient::new(config.github_config()).context("Failed to build forge client")?;
    let authority = cla_authority(&config)?;
    let store = config
        .store
        .open()
        .await
        .context("Failed to open audit record store")?;
    let notifier: Arc<dyn Notifier> = match &config.mail_spool_dir {
        Some(dir) => Arc::new(
            SpoolNotifier::new(dir)
                .with_context(|| format!("Failed to open mail spool {:?}", dir))?,
        ),
        None => Arc::new(LogNotifier),
    };

    let pipeline = ValidationPipeline::new(
        Arc::new(forge),
        Arc::new(authority),
        store,
        notifier,
        config,
    );
    let dispatcher = EventDispatcher::new(pipeline);

    info!(event, payload = ?payload, "dispatching webhook payload");
    let outcome = dispatcher.dispatch(&EventKind::from(event), &body).await;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::PullRequest(run) => print_run(run),
        DispatchOutcome::Status { third_party } => {
            let origin = if *third_party { "third-party" } else { "self-reported" };
            println!("Status event ({}), nothing to do", origin);
        }
        DispatchOutcome::Unhandled { event } => println!("Unhandled event kind '{}'", event),
        DispatchOutcome::Malformed { reason } => println!("Malformed payload: {}", reason),
    }
}

fn print_run(run: &PipelineOutcome) {
    println!("{}", run.transaction_id);
    let stages: Vec<String> = run.stages.iter().map(|s| format!("{:?}", s)).collect();
    println!("Stages:  {}", stages.join(" -> "));

    if let Some(verdict) = &run.verdict {
        println!("State:   {}", verdict.state);
        println!("Record:  {}", verdict.audit_key);
        println!();
        for line in verdict.message.lines() {
            println!("    {}", line);
        }
    }
    if let Some(halted) = &run.halted {
        println!();
        println!("Halted at {:?}: {}", halted.stage, halted.reason);
    }
}

async fn cmd_details(config: &ServiceConfig, key: &str) -> Result<()> {
    let key: AuditKey = key
        .parse()
        .with_context(|| format!("'{}' is not an audit key", key))?;

    let store = config
        .store
        .open()
        .await
        .context("Failed to open audit record store")?;
    let classification = AuditRecorder::new(store)
        .load(&key)
        .await
        .with_context(|| format!("No audit record for {}", key))?;

    println!("{}", serde_json::to_string_pretty(&classification)?);
    Ok(())
}

async fn cmd_lookup(config: &ServiceConfig, identity: &str) -> Result<()> {
    let status = cla_authority(config)?
        .lookup(identity)
        .await
        .with_context(|| format!("CLA lookup for '{}' failed", identity))?;

    let label = match status {
        ClaStatus::Valid => "valid",
        ClaStatus::Invalid => "invalid",
        ClaStatus::Unknown => "unknown",
    };
    println!("{}: {}", identity, label);
    Ok(())
}
