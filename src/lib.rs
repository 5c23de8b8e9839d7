//! Pro Workflow - Session Telemetry and Feedback for Coding-Agent Hooks
//!
//! Runs inside the host's lifecycle hooks and turns a stream of prompts,
//! responses and tool uses into short advisories:
//! - Learnings captured from `[LEARN]` annotations and surfaced at session start
//! - Correction tracking on user prompts
//! - Drift detection against the session's original intent
//! - Wrap-up reminders and post-edit scans
//!
//! # Architecture
//!
//! - **Types**: Persistent records (LearningRecord, SessionState, DriftState)
//! - **Storage**: Key-value stores over JSON files or memory
//! - **Detectors**: Correction, drift, reminder and edit-scan heuristics
//! - **Hooks**: Event payloads and the engine that routes them
//!
//! # Example
//!
//! ```ignore
//! use pro_workflow_core::{HookEngine, HookEvent, HookKind, HookOptions, ProjectContext, WorkflowConfig};
//!
//! #[tokio::main]
//! async fn main() -> pro_workflow_core::Result<()> {
//!     let project = ProjectContext::current();
//!     let config = WorkflowConfig::load_or_default(&project.root);
//!     let engine = HookEngine::for_project(config, HookOptions::all(), project);
//!
//!     let event = HookEvent::parse(HookKind::UserPromptSubmit, r#"{"session_id":"s1","prompt":"wrong, use tokio"}"#)?;
//!     for advisory in engine.handle(&event).await.advisories {
//!         eprintln!("{}", advisory);
//!     }
//!     Ok(())
//! }
//! ```

pub mod annotation;
pub mod config;
pub mod detectors;
pub mod enrichment;
pub mod error;
pub mod hooks;
pub mod keywords;
pub mod learning;
pub mod project;
pub mod session;
pub mod storage;
pub mod transcript;
pub mod types;

// Re-export commonly used types
pub use annotation::{Annotation, AnnotationParser};
pub use config::WorkflowConfig;
pub use detectors::{CorrectionDetector, DriftDetector, DriftWarning};
pub use error::{Result, WorkflowError};
pub use hooks::{HookEngine, HookEvent, HookKind, HookOptions, HookOutcome, StoreSet};
pub use keywords::extract_keywords;
pub use learning::LearningStore;
pub use project::ProjectContext;
pub use session::SessionStore;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use types::{Advisory, AdvisoryKind, Counter, DriftState, LearningRecord, SessionState};
