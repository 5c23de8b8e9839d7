//! Common test utilities and helpers

#![allow(dead_code)]

use pro_workflow_core::{
    HookEngine, HookEvent, HookKind, HookOptions, ProjectContext, StoreSet, WorkflowConfig,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary project directory named `name`
pub struct TestProject {
    _temp: TempDir,
    pub context: ProjectContext,
}

impl TestProject {
    pub fn new(name: &str) -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path().join(name);
        std::fs::create_dir_all(&root).expect("Failed to create project dir");

        Self {
            context: ProjectContext::from_dir(&root),
            _temp: temp,
        }
    }

    pub fn root(&self) -> &Path {
        &self.context.root
    }

    /// Config with every store kept inside the project
    pub fn config(&self) -> WorkflowConfig {
        let mut config = WorkflowConfig::default();
        config.storage.drift_dir = Some(PathBuf::from(".claude").join("drift"));
        config
    }

    /// Fresh engine over this project's on-disk stores
    pub fn engine(&self, options: HookOptions) -> HookEngine {
        let config = self.config();
        let stores = StoreSet::on_disk(&config, &self.context);
        HookEngine::new(config, options, self.context.clone(), stores)
    }

    /// Write a JSONL transcript holding one assistant entry per message
    pub fn write_transcript(&self, messages: &[&str]) -> PathBuf {
        let path = self.root().join("transcript.jsonl");
        let mut lines = vec![json!({"type": "user", "message": {"content": "go"}}).to_string()];
        for message in messages {
            lines.push(
                json!({
                    "type": "assistant",
                    "message": {"content": [{"type": "text", "text": message}]}
                })
                .to_string(),
            );
        }
        std::fs::write(&path, lines.join("\n")).expect("Failed to write transcript");
        path
    }
}

pub fn prompt_event(session_id: &str, prompt: &str) -> HookEvent {
    let payload = json!({"session_id": session_id, "prompt": prompt}).to_string();
    HookEvent::parse(HookKind::UserPromptSubmit, &payload).expect("valid prompt payload")
}

pub fn stop_event(session_id: &str, transcript: Option<&Path>) -> HookEvent {
    let payload = json!({"session_id": session_id, "transcript_path": transcript}).to_string();
    HookEvent::parse(HookKind::Stop, &payload).expect("valid stop payload")
}

pub fn edit_event(session_id: &str, file_path: &str) -> HookEvent {
    let payload = json!({
        "session_id": session_id,
        "tool_name": "Edit",
        "tool_input": {"file_path": file_path}
    })
    .to_string();
    HookEvent::parse(HookKind::PostToolUse, &payload).expect("valid tool payload")
}

pub fn session_start_event(session_id: &str) -> HookEvent {
    let payload = json!({"session_id": session_id, "source": "startup"}).to_string();
    HookEvent::parse(HookKind::SessionStart, &payload).expect("valid session start payload")
}
