//! Hook engine: routes lifecycle events to the detectors
//!
//! One event is handled start to finish per invocation. The engine never
//! returns an error; whatever goes wrong inside shows up only as a missing
//! advisory and a log line.

pub mod events;

pub use events::{HookEvent, HookKind, PromptEvent, SessionStartEvent, StopEvent, ToolUseEvent};

use crate::annotation::AnnotationParser;
use crate::config::WorkflowConfig;
use crate::detectors::{is_edit_tool, CorrectionDetector, DriftDetector, EditScanner, WrapUpReminder};
use crate::enrichment::{is_valid_agent_name, Announcer, FallbackChain, StaticProvider};
use crate::learning::{render_learnings, LearningStore};
use crate::project::ProjectContext;
use crate::session::SessionStore;
use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use crate::transcript::recent_assistant_text;
use crate::types::{Advisory, AdvisoryKind, Counter};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Per-invocation feature switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookOptions {
    /// Append each prompt to the session record
    pub store_prompt: bool,
    /// Give the session an agent name on its first prompt
    pub name_agent: bool,
    pub detect_corrections: bool,
    pub detect_drift: bool,
    /// Capture `[LEARN]` annotations on stop
    pub learn_capture: bool,
    /// Wrap-up reminders on stop
    pub session_check: bool,
    /// Surface top learnings on session start
    pub load_learnings: bool,
    /// Announce completion on stop
    pub notify: bool,
    /// Scan edited files for leftovers
    pub scan_edits: bool,
}

impl HookOptions {
    pub fn all() -> Self {
        Self {
            store_prompt: true,
            name_agent: true,
            detect_corrections: true,
            detect_drift: true,
            learn_capture: true,
            session_check: true,
            load_learnings: true,
            notify: true,
            scan_edits: true,
        }
    }
}

/// Backing stores for the three record families
#[derive(Clone)]
pub struct StoreSet {
    pub learnings: Arc<dyn KeyValueStore>,
    pub sessions: Arc<dyn KeyValueStore>,
    pub drift: Arc<dyn KeyValueStore>,
}

impl StoreSet {
    /// File stores laid out per the storage config
    pub fn on_disk(config: &WorkflowConfig, project: &ProjectContext) -> Self {
        let storage = &config.storage;
        Self {
            learnings: Arc::new(JsonFileStore::new(storage.learnings_dir(&project.root))),
            sessions: Arc::new(JsonFileStore::new(storage.sessions_dir(&project.root))),
            drift: Arc::new(JsonFileStore::with_prefix(
                storage.drift_dir(&project.root),
                "intent-",
            )),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            learnings: Arc::new(MemoryStore::new()),
            sessions: Arc::new(MemoryStore::new()),
            drift: Arc::new(MemoryStore::new()),
        }
    }
}

/// What the host should see after an event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookOutcome {
    /// Lines for the diagnostic channel
    pub advisories: Vec<Advisory>,

    /// Context injected into the session (session start only)
    pub additional_context: Option<String>,
}

impl HookOutcome {
    /// Structured stdout response for the host, if there is anything to add
    pub fn host_output(&self, kind: HookKind) -> Option<serde_json::Value> {
        self.additional_context.as_ref().map(|context| {
            json!({
                "hookSpecificOutput": {
                    "hookEventName": kind.to_string(),
                    "additionalContext": context,
                }
            })
        })
    }
}

pub struct HookEngine {
    config: WorkflowConfig,
    options: HookOptions,
    project: ProjectContext,
    sessions: SessionStore,
    learnings: LearningStore,
    parser: AnnotationParser,
    drift: DriftDetector,
    corrections: CorrectionDetector,
    reminder: WrapUpReminder,
    scanner: EditScanner,
    agent_names: FallbackChain,
    completions: FallbackChain,
    announcer: Announcer,
}

impl HookEngine {
    pub fn new(
        config: WorkflowConfig,
        options: HookOptions,
        project: ProjectContext,
        stores: StoreSet,
    ) -> Self {
        let sessions = SessionStore::new(stores.sessions);
        let enrichment = &config.enrichment;

        Self {
            learnings: LearningStore::new(stores.learnings),
            parser: AnnotationParser::new(config.learning.annotation_lookahead),
            drift: DriftDetector::new(stores.drift, sessions.clone(), config.drift.clone()),
            corrections: CorrectionDetector::new(sessions.clone()),
            reminder: WrapUpReminder::new(sessions.clone(), config.session.reminder_interval),
            scanner: EditScanner::new(config.session.max_scan_findings),
            agent_names: FallbackChain::from_commands(&enrichment.agent_name)
                .with_validator(is_valid_agent_name),
            completions: FallbackChain::from_commands(&enrichment.completion)
                .with_fallback(StaticProvider::completion_messages()),
            announcer: Announcer::new(enrichment.tts.clone()),
            sessions,
            config,
            options,
            project,
        }
    }

    /// Engine over the on-disk stores of `project`
    pub fn for_project(config: WorkflowConfig, options: HookOptions, project: ProjectContext) -> Self {
        let stores = StoreSet::on_disk(&config, &project);
        Self::new(config, options, project, stores)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn learnings(&self) -> &LearningStore {
        &self.learnings
    }

    pub fn drift(&self) -> &DriftDetector {
        &self.drift
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    /// Handle one event
    pub async fn handle(&self, event: &HookEvent) -> HookOutcome {
        debug!("Handling {} for session {}", event.kind(), event.session_id());
        match event {
            HookEvent::SessionStart(e) => self.on_session_start(e).await,
            HookEvent::UserPromptSubmit(e) => self.on_prompt(e).await,
            HookEvent::Stop(e) => self.on_stop(e).await,
            HookEvent::PostToolUse(e) => self.on_tool_use(e).await,
        }
    }

    async fn on_session_start(&self, event: &SessionStartEvent) -> HookOutcome {
        let mut outcome = HookOutcome::default();
        if !self.options.load_learnings {
            return outcome;
        }

        let top = self
            .learnings
            .top(&self.project.name, self.config.learning.top_n)
            .await;
        debug!(
            "Session {} ({}): {} learnings to surface",
            event.session_id,
            event.source,
            top.len()
        );
        outcome.additional_context = render_learnings(&top);
        outcome
    }

    async fn on_prompt(&self, event: &PromptEvent) -> HookOutcome {
        let mut outcome = HookOutcome::default();
        let session_id = event.session_id.as_str();

        if self.options.store_prompt || self.options.name_agent {
            self.record_prompt(session_id, &event.prompt).await;
        }

        if self.options.detect_corrections && self.config.correction.enabled {
            if let Some(advisory) = self.corrections.observe(session_id, &event.prompt).await {
                outcome.advisories.push(advisory);
            }
        }

        if self.options.detect_drift {
            if let Some(warning) = self.drift.observe(session_id, &event.prompt).await {
                outcome.advisories.push(warning.to_advisory());
            }
        }

        outcome
    }

    /// Append the prompt and, when asked, name the agent (first name sticks)
    async fn record_prompt(&self, session_id: &str, prompt: &str) {
        let mut state = self.sessions.load(session_id).await;
        state.append_prompt(prompt);

        if self.options.name_agent && state.agent_name.is_none() {
            if let Some(name) = self.agent_names.run().await {
                info!("Session {} is now '{}'", session_id, name);
                state.set_agent_name(&name);
            }
        }

        if let Err(e) = self.sessions.save(&state).await {
            debug!("Could not save session {}: {}", session_id, e);
        }
    }

    async fn on_stop(&self, event: &StopEvent) -> HookOutcome {
        let mut outcome = HookOutcome::default();

        if self.options.learn_capture {
            if let Some(advisory) = self.capture_learnings(event).await {
                outcome.advisories.push(advisory);
            }
        }

        if self.options.session_check {
            if let Some(advisory) = self.reminder.observe(&event.session_id).await {
                outcome.advisories.push(advisory);
            }
        }

        if self.options.notify {
            self.announce_completion().await;
        }

        outcome
    }

    async fn capture_learnings(&self, event: &StopEvent) -> Option<Advisory> {
        // A stop re-entered through a stop hook sees the same transcript tail
        if event.stop_hook_active {
            debug!("Skipping capture for re-entered stop in {}", event.session_id);
            return None;
        }
        let path = event.transcript_path.as_ref()?;
        let text = match recent_assistant_text(path, self.config.learning.transcript_tail_lines).await
        {
            Ok(text) => text,
            Err(e) => {
                debug!("Transcript {} unavailable: {}", path.display(), e);
                return None;
            }
        };

        let annotations = self.parser.parse(&text);
        if annotations.is_empty() {
            return None;
        }

        let summary = self
            .learnings
            .submit_batch(&annotations, &self.project.name)
            .await;
        if summary.created == 0 || !summary.persisted {
            return None;
        }

        Some(Advisory::new(
            AdvisoryKind::Learning,
            format!(
                "Captured {} new learning(s) from [LEARN] tags.",
                summary.created
            ),
        ))
    }

    async fn announce_completion(&self) {
        if !self.announcer.is_configured() {
            return;
        }
        if let Some(message) = self.completions.run().await {
            self.announcer.announce(&message).await;
        }
    }

    async fn on_tool_use(&self, event: &ToolUseEvent) -> HookOutcome {
        let mut outcome = HookOutcome::default();
        if !is_edit_tool(&event.tool_name) {
            return outcome;
        }

        self.sessions
            .increment(&event.session_id, Counter::Edits)
            .await;

        if self.options.scan_edits {
            if let Some(path) = event.file_path() {
                let path = self.project.root.join(path);
                if let Some(advisory) = self.scanner.scan_file(&path).await {
                    outcome.advisories.push(advisory);
                }
            }
        }

        outcome
    }
}
