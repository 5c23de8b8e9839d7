//! Core data types for the pro-workflow hook engine
//!
//! This module defines the records that persist between hook invocations
//! (learnings, session counters, drift anchors) and the advisory messages the
//! detectors hand back to the host.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Prefix of every line printed to the host's diagnostic channel
pub const ADVISORY_PREFIX: &str = "[pro-workflow]";

/// A reusable rule captured from a `[LEARN]` annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub category: String,

    pub rule: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub mistake: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub correction: Option<String>,

    /// Project the rule was first captured in (working directory name)
    #[serde(default)]
    pub project: String,

    /// A missing date reads as the load time
    #[serde(
        rename = "date",
        alias = "created_at",
        default = "Utc::now",
        deserialize_with = "flexible_timestamp"
    )]
    pub created_at: DateTime<Utc>,

    /// Repeat sightings after the first capture
    #[serde(default)]
    pub times_applied: u64,
}

impl LearningRecord {
    pub fn new(category: &str, rule: &str, project: &str) -> Self {
        Self {
            category: category.trim().to_string(),
            rule: rule.trim().to_string(),
            mistake: None,
            correction: None,
            project: project.to_string(),
            created_at: Utc::now(),
            times_applied: 0,
        }
    }

    /// Identity used for deduplication: (category, rule), trimmed and
    /// compared case-insensitively.
    pub fn identity(&self) -> (String, String) {
        identity_key(&self.category, &self.rule)
    }

    pub fn matches(&self, category: &str, rule: &str) -> bool {
        self.identity() == identity_key(category, rule)
    }
}

pub fn identity_key(category: &str, rule: &str) -> (String, String) {
    (
        category.trim().to_lowercase(),
        rule.trim().to_lowercase(),
    )
}

/// Older stores write absent sub-fields as empty strings
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Accepts RFC 3339 timestamps and naive ISO timestamps (read as UTC)
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Per-session counters and flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub session_id: String,
    pub response_count: u64,
    pub corrections_count: u64,
    pub edit_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub prompts: Vec<String>,
}

/// Counters tracked in [`SessionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Responses,
    Corrections,
    Edits,
}

impl SessionState {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            ..Default::default()
        }
    }

    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Responses => self.response_count,
            Counter::Corrections => self.corrections_count,
            Counter::Edits => self.edit_count,
        }
    }

    /// Bump a counter and return its new value
    pub fn increment(&mut self, counter: Counter) -> u64 {
        let field = match counter {
            Counter::Responses => &mut self.response_count,
            Counter::Corrections => &mut self.corrections_count,
            Counter::Edits => &mut self.edit_count,
        };
        *field = field.saturating_add(1);
        *field
    }

    pub fn append_prompt(&mut self, prompt: &str) {
        self.prompts.push(prompt.to_string());
    }

    /// First writer wins. Returns whether the name was stored.
    pub fn set_agent_name(&mut self, name: &str) -> bool {
        if self.agent_name.is_some() {
            return false;
        }
        self.agent_name = Some(name.to_string());
        true
    }
}

/// Original-intent anchor for drift detection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftState {
    #[serde(default)]
    pub session_id: String,

    /// Keywords of the session's first prompt; never changed afterwards
    pub original_keywords: BTreeSet<String>,

    #[serde(default)]
    pub prompt_count: u64,
}

/// Which detector produced an advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryKind {
    Correction,
    Drift,
    Learning,
    Reminder,
    EditScan,
}

/// A non-blocking diagnostic for the host's secondary output channel
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
}

impl Advisory {
    pub fn new(kind: AdvisoryKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Advisory {
    /// The first line carries the prefix; follow-up lines of a multi-line
    /// advisory that are not indented get it as well.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, line) in self.message.lines().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if i == 0 || !line.starts_with(' ') {
                write!(f, "{} {}", ADVISORY_PREFIX, line)?;
            } else {
                write!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}
