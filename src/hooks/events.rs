//! Hook payloads delivered by the host on stdin

use crate::error::{Result, WorkflowError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

fn unknown_session() -> String {
    "unknown".to_string()
}

/// Which hook is being run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookKind {
    SessionStart,
    UserPromptSubmit,
    Stop,
    PostToolUse,
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HookKind::SessionStart => "SessionStart",
            HookKind::UserPromptSubmit => "UserPromptSubmit",
            HookKind::Stop => "Stop",
            HookKind::PostToolUse => "PostToolUse",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStartEvent {
    #[serde(default = "unknown_session")]
    pub session_id: String,

    /// "startup", "resume" or "clear"
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptEvent {
    #[serde(default = "unknown_session")]
    pub session_id: String,

    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopEvent {
    #[serde(default = "unknown_session")]
    pub session_id: String,

    #[serde(default)]
    pub transcript_path: Option<PathBuf>,

    #[serde(default)]
    pub stop_hook_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUseEvent {
    #[serde(default = "unknown_session")]
    pub session_id: String,

    #[serde(default)]
    pub tool_name: String,

    #[serde(default)]
    pub tool_input: Value,
}

impl ToolUseEvent {
    /// `tool_input.file_path`, when present and non-empty
    pub fn file_path(&self) -> Option<PathBuf> {
        self.tool_input
            .get("file_path")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}

/// A lifecycle event from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hook_event_name")]
pub enum HookEvent {
    SessionStart(SessionStartEvent),
    UserPromptSubmit(PromptEvent),
    Stop(StopEvent),
    PostToolUse(ToolUseEvent),
}

impl HookEvent {
    /// Decode a payload for a known hook
    pub fn parse(kind: HookKind, input: &str) -> Result<Self> {
        let event = match kind {
            HookKind::SessionStart => HookEvent::SessionStart(serde_json::from_str(input)?),
            HookKind::UserPromptSubmit => HookEvent::UserPromptSubmit(serde_json::from_str(input)?),
            HookKind::Stop => HookEvent::Stop(serde_json::from_str(input)?),
            HookKind::PostToolUse => HookEvent::PostToolUse(serde_json::from_str(input)?),
        };
        Ok(event)
    }

    /// Decode a payload that names its own hook in `hook_event_name`
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input)
            .map_err(|e| WorkflowError::InvalidInput(format!("unrecognized hook payload: {}", e)))
    }

    pub fn kind(&self) -> HookKind {
        match self {
            HookEvent::SessionStart(_) => HookKind::SessionStart,
            HookEvent::UserPromptSubmit(_) => HookKind::UserPromptSubmit,
            HookEvent::Stop(_) => HookKind::Stop,
            HookEvent::PostToolUse(_) => HookKind::PostToolUse,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            HookEvent::SessionStart(e) => &e.session_id,
            HookEvent::UserPromptSubmit(e) => &e.session_id,
            HookEvent::Stop(e) => &e.session_id,
            HookEvent::PostToolUse(e) => &e.session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt_defaults_session() {
        let event = HookEvent::parse(HookKind::UserPromptSubmit, r#"{"prompt": "hi"}"#).unwrap();
        assert_eq!(event.session_id(), "unknown");
        assert_eq!(event.kind(), HookKind::UserPromptSubmit);
    }

    #[test]
    fn test_from_json_uses_event_name() {
        let input = r#"{
            "hook_event_name": "PostToolUse",
            "session_id": "abc",
            "tool_name": "Write",
            "tool_input": {"file_path": "src/lib.rs", "content": "..."}
        }"#;

        let event = HookEvent::from_json(input).unwrap();
        match event {
            HookEvent::PostToolUse(tool) => {
                assert_eq!(tool.tool_name, "Write");
                assert_eq!(tool.file_path(), Some(PathBuf::from("src/lib.rs")));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_stop_without_transcript() {
        let event = HookEvent::parse(HookKind::Stop, r#"{"session_id": "s"}"#).unwrap();
        assert_eq!(
            event,
            HookEvent::Stop(StopEvent {
                session_id: "s".to_string(),
                transcript_path: None,
                stop_hook_active: false,
            })
        );
    }

    #[test]
    fn test_malformed_payload() {
        assert!(HookEvent::parse(HookKind::Stop, "not json").is_err());
        assert!(HookEvent::from_json(r#"{"hook_event_name": "Nope"}"#).is_err());
    }
}
