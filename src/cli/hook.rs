//! Hook command, invoked by the host with an event payload on stdin

use clap::{Args, ValueEnum};
use pro_workflow_core::{
    error::Result, HookEngine, HookEvent, HookKind, HookOptions, ProjectContext, WorkflowConfig,
};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Hook events the command can be registered for
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HookArg {
    /// Session begins or resumes
    SessionStart,
    /// User submitted a prompt
    PromptSubmit,
    /// Assistant finished responding
    Stop,
    /// A tool call completed
    PostToolUse,
}

impl From<HookArg> for HookKind {
    fn from(arg: HookArg) -> Self {
        match arg {
            HookArg::SessionStart => HookKind::SessionStart,
            HookArg::PromptSubmit => HookKind::UserPromptSubmit,
            HookArg::Stop => HookKind::Stop,
            HookArg::PostToolUse => HookKind::PostToolUse,
        }
    }
}

/// Features enabled for this invocation
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct HookFlags {
    /// Append the prompt to the session record
    #[arg(long)]
    pub store_last_prompt: bool,

    /// Name the agent on the first prompt of a session
    #[arg(long)]
    pub name_agent: bool,

    /// Count correction prompts
    #[arg(long)]
    pub detect_corrections: bool,

    /// Warn when prompts drift from the original intent
    #[arg(long)]
    pub detect_drift: bool,

    /// Capture [LEARN] annotations from the transcript
    #[arg(long)]
    pub learn_capture: bool,

    /// Remind to wrap up every few responses
    #[arg(long)]
    pub session_check: bool,

    /// Surface stored learnings at session start
    #[arg(long)]
    pub load_learnings: bool,

    /// Announce completion through the configured speech command
    #[arg(long)]
    pub notify: bool,

    /// Scan edited files for debug statements and secrets
    #[arg(long)]
    pub scan_edits: bool,

    /// Enable every feature
    #[arg(long)]
    pub all: bool,
}

impl From<HookFlags> for HookOptions {
    fn from(flags: HookFlags) -> Self {
        if flags.all {
            return HookOptions::all();
        }
        HookOptions {
            store_prompt: flags.store_last_prompt,
            name_agent: flags.name_agent,
            detect_corrections: flags.detect_corrections,
            detect_drift: flags.detect_drift,
            learn_capture: flags.learn_capture,
            session_check: flags.session_check,
            load_learnings: flags.load_learnings,
            notify: flags.notify,
            scan_edits: flags.scan_edits,
        }
    }
}

/// Handle one hook invocation
///
/// Advisories go to stderr and structured host output to stdout. Unreadable
/// or malformed input is logged and otherwise ignored so the host session
/// never sees a failing hook.
pub async fn handle(
    kind: HookArg,
    flags: HookFlags,
    config: WorkflowConfig,
    project: ProjectContext,
) -> Result<()> {
    let kind = HookKind::from(kind);

    let mut input = String::new();
    if let Err(e) = tokio::io::stdin().read_to_string(&mut input).await {
        debug!("Could not read {} payload: {}", kind, e);
        return Ok(());
    }

    let event = match HookEvent::parse(kind, &input) {
        Ok(event) => event,
        Err(e) => {
            debug!("Ignoring malformed {} payload: {}", kind, e);
            return Ok(());
        }
    };

    let engine = HookEngine::for_project(config, flags.into(), project);
    let outcome = engine.handle(&event).await;

    for advisory in &outcome.advisories {
        eprintln!("{}", advisory);
    }

    if let Some(output) = outcome.host_output(kind) {
        println!("{}", serde_json::to_string(&output)?);
    }

    Ok(())
}
