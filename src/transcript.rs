//! Reading recent assistant output from a session transcript
//!
//! Transcripts are JSONL: one entry per line, assistant entries carry either a
//! string `message.content` or a list of content blocks of which only `text`
//! blocks are of interest.

use crate::error::Result;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Concatenate the text of assistant entries among the last `tail_lines`
/// lines of the transcript at `path`.
///
/// Lines that are not valid JSON are skipped.
pub async fn recent_assistant_text(path: &Path, tail_lines: usize) -> Result<String> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(assistant_text_from_lines(&raw, tail_lines))
}

pub fn assistant_text_from_lines(raw: &str, tail_lines: usize) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    let start = lines.len().saturating_sub(tail_lines);

    let mut text = String::new();
    for line in &lines[start..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry: Value = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unparseable transcript line: {}", e);
                continue;
            }
        };
        if entry.get("type").and_then(Value::as_str) != Some("assistant") {
            continue;
        }

        match entry.pointer("/message/content") {
            Some(Value::String(content)) => {
                text.push_str(content);
                text.push('\n');
            }
            Some(Value::Array(blocks)) => {
                for block in blocks {
                    if block.get("type").and_then(Value::as_str) == Some("text") {
                        if let Some(block_text) = block.get("text").and_then(Value::as_str) {
                            text.push_str(block_text);
                            text.push('\n');
                        }
                    }
                }
            }
            _ => {}
        }
    }

    text
}
