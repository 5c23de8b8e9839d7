//! Pro Workflow - session telemetry and feedback hooks
//!
//! Entry point for the hook commands registered with the host, plus a few
//! inspection commands for stored learnings and configuration.

mod cli;

use clap::{Parser, Subcommand};
use cli::{config::ConfigAction, hook::HookArg, hook::HookFlags};
use pro_workflow_core::{error::Result, ProjectContext, WorkflowConfig};
use std::path::PathBuf;
use tracing::{debug, warn, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "pro-workflow")]
#[command(about = "Session telemetry and feedback hooks for coding agents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "warn", env = "PRO_WORKFLOW_LOG")]
    log_level: String,

    /// Config file (overrides .claude/pro-workflow.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    project_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle a hook event read from stdin
    Hook {
        /// Which hook is being run
        #[arg(value_enum)]
        kind: HookArg,

        #[command(flatten)]
        flags: HookFlags,
    },

    /// List stored learnings
    Learnings {
        /// Project to list (defaults to the current project)
        #[arg(short, long)]
        project: Option<String>,

        /// Maximum number of learnings
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Explicit config file if given, else the project's file or defaults
fn resolve_config(explicit: Option<&PathBuf>, project: &ProjectContext) -> WorkflowConfig {
    match explicit {
        Some(path) => WorkflowConfig::from_file(path).unwrap_or_else(|e| {
            warn!("Ignoring config {}: {}", path.display(), e);
            WorkflowConfig::default()
        }),
        None => WorkflowConfig::load_or_default(&project.root),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // Hooks talk to the host over stdout, so logs go to stderr
    let filter = EnvFilter::new(format!(
        "pro_workflow={},pro_workflow_core={}",
        level.as_str().to_lowercase(),
        level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("pro-workflow v{} starting...", env!("CARGO_PKG_VERSION"));

    let project = match &cli.project_dir {
        Some(dir) => ProjectContext::from_dir(dir),
        None => ProjectContext::current(),
    };
    let config = resolve_config(cli.config.as_ref(), &project);

    match cli.command {
        Commands::Hook { kind, flags } => cli::hook::handle(kind, flags, config, project).await,
        Commands::Learnings { project: name, limit } => {
            cli::learnings::handle(name, limit, config, project).await
        }
        Commands::Config { action } => cli::config::handle(action, config, project).await,
    }
}
