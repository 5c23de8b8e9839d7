//! Best-effort enrichment through external providers
//!
//! Agent names and completion messages can come from local or hosted models
//! wrapped as commands. Providers are tried in priority order, each under its
//! own timeout; the first output that passes validation wins and exhaustion
//! falls back to a static default. Nothing here ever returns an error to the
//! hook engine.

use crate::config::CommandSpec;
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Default completion messages
pub const COMPLETION_MESSAGES: &[&str] = &[
    "Work complete!",
    "All done!",
    "Task finished!",
    "Job complete!",
    "Ready for next task!",
];

/// A source of generated text
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self) -> Result<String>;
}

/// Runs a command and uses its trimmed stdout
pub struct CommandProvider {
    spec: CommandSpec,
}

impl CommandProvider {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }

    fn failure(&self, reason: impl Into<String>) -> WorkflowError {
        WorkflowError::Enrichment {
            provider: self.spec.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Provider for CommandProvider {
    fn name(&self) -> &str {
        &self.spec.name
    }

    async fn generate(&self) -> Result<String> {
        let output = run_command(&self.spec, &[]).await?;
        if !output.status.success() {
            return Err(self.failure(format!("exited with {}", output.status)));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(self.failure("empty output"));
        }
        Ok(text)
    }
}

/// Picks one of a fixed set of messages
pub struct StaticProvider {
    choices: Vec<String>,
}

impl StaticProvider {
    pub fn new<S: AsRef<str>>(choices: &[S]) -> Self {
        Self {
            choices: choices.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    pub fn completion_messages() -> Self {
        Self::new(COMPLETION_MESSAGES)
    }

    pub fn pick(&self) -> Option<String> {
        self.choices.choose(&mut rand::thread_rng()).cloned()
    }
}

#[async_trait]
impl Provider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn generate(&self) -> Result<String> {
        self.pick()
            .ok_or_else(|| WorkflowError::Other("no static choices".to_string()))
    }
}

/// Output filter applied to each provider's result
pub type Validator = fn(&str) -> bool;

fn accept_any(output: &str) -> bool {
    !output.trim().is_empty()
}

/// Agent names must be a single alphanumeric word
pub fn is_valid_agent_name(output: &str) -> bool {
    let name = output.trim();
    !name.is_empty() && name.split_whitespace().count() == 1 && name.chars().all(char::is_alphanumeric)
}

/// Ordered providers with an optional static fallback
pub struct FallbackChain {
    providers: Vec<Box<dyn Provider>>,
    validator: Validator,
    fallback: Option<StaticProvider>,
}

impl FallbackChain {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self {
            providers,
            validator: accept_any,
            fallback: None,
        }
    }

    pub fn from_commands(specs: &[CommandSpec]) -> Self {
        Self::new(
            specs
                .iter()
                .cloned()
                .map(|spec| Box::new(CommandProvider::new(spec)) as Box<dyn Provider>)
                .collect(),
        )
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_fallback(mut self, fallback: StaticProvider) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// First valid provider output, or the static fallback
    pub async fn run(&self) -> Option<String> {
        for provider in &self.providers {
            match provider.generate().await {
                Ok(output) if (self.validator)(&output) => {
                    debug!("Provider '{}' succeeded", provider.name());
                    return Some(output.trim().to_string());
                }
                Ok(output) => {
                    debug!("Provider '{}' returned invalid output: {:?}", provider.name(), output);
                }
                Err(e) => {
                    debug!("Provider '{}' failed: {}", provider.name(), e);
                }
            }
        }

        self.fallback.as_ref().and_then(StaticProvider::pick)
    }
}

/// Speaks a message through an external TTS command
pub struct Announcer {
    command: Option<CommandSpec>,
}

impl Announcer {
    pub fn new(command: Option<CommandSpec>) -> Self {
        Self { command }
    }

    pub fn is_configured(&self) -> bool {
        self.command.is_some()
    }

    /// Speak `message`. Returns whether the command ran to success.
    pub async fn announce(&self, message: &str) -> bool {
        let Some(spec) = &self.command else {
            return false;
        };

        match run_command(spec, &[message]).await {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("Announcement via '{}' failed: {}", spec.name, e);
                false
            }
        }
    }
}

/// Run `spec` with `extra_args` appended, killing it at its timeout
async fn run_command(spec: &CommandSpec, extra_args: &[&str]) -> Result<std::process::Output> {
    let child = Command::new(&spec.program)
        .args(&spec.args)
        .args(extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
        Ok(output) => Ok(output?),
        Err(_) => Err(WorkflowError::Timeout(spec.timeout)),
    }
}
