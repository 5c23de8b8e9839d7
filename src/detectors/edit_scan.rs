//! Post-edit source scan
//!
//! After the agent edits a file, the file is checked for leftover debug
//! statements, untracked TODO markers and anything that looks like a
//! hardcoded credential. Findings are advisory only.

use crate::types::{Advisory, AdvisoryKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Tools whose use counts as an edit
pub const EDIT_TOOLS: &[&str] = &["Edit", "Write", "MultiEdit"];

pub fn is_edit_tool(tool_name: &str) -> bool {
    EDIT_TOOLS.contains(&tool_name)
}

const CHECKABLE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "py", "pyw", "php", "dart", "rb", "go", "rs", "java",
    "kt", "kts", "vue", "svelte", "css", "scss", "less", "html", "htm", "json", "yaml", "yml",
    "toml", "sh", "bash", "zsh", "md",
];

struct Rule {
    pattern: Regex,
    description: &'static str,
}

fn rules(specs: &[(&str, &'static str)]) -> Vec<Rule> {
    specs
        .iter()
        .map(|&(pattern, description)| Rule {
            pattern: Regex::new(pattern).expect("scan pattern is valid"),
            description,
        })
        .collect()
}

static DEBUG_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    rules(&[
        // JavaScript / TypeScript
        (r"\bconsole\.(log|debug|info|warn|error|trace|dir)\s*\(", "console.log statement"),
        (r"\bdebugger\b", "debugger statement"),
        (r"\balert\s*\(", "alert() call"),
        // PHP
        (r"\bdd\s*\(", "dd() call"),
        (r"\bdump\s*\(", "dump() call"),
        (r"\bvar_dump\s*\(", "var_dump() call"),
        (r"\bprint_r\s*\(", "print_r() call"),
        (r"\bray\s*\(", "ray() call"),
        // Python
        (r"(?:^|[^.\w])print\s*\(", "print() statement"),
        (r"\bbreakpoint\s*\(", "breakpoint() call"),
        (r"\bpdb\.set_trace\s*\(", "pdb.set_trace() call"),
        (r"\bipdb\.set_trace\s*\(", "ipdb.set_trace() call"),
        // Dart / Flutter
        (r"\bdebugPrint\s*\(", "debugPrint() call"),
    ])
});

static SECRET_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    rules(&[
        (
            r#"(?i)(api[_-]?key|api[_-]?secret|auth[_-]?token|access[_-]?token|secret[_-]?key|private[_-]?key)\s*[=:]\s*["'][^"']{8,}"#,
            "potential hardcoded secret",
        ),
        (
            r#"(?i)(password|passwd|pwd)\s*[=:]\s*["'][^"']{4,}"#,
            "potential hardcoded password",
        ),
        (
            r"(?:sk|pk)[-_](?:live|test)[-_][a-zA-Z0-9]{20,}",
            "potential API key (Stripe-like pattern)",
        ),
        (r"ghp_[a-zA-Z0-9]{36}", "potential GitHub personal access token"),
        (
            r"-----BEGIN (?:RSA |EC |DSA )?PRIVATE KEY-----",
            "private key in source code",
        ),
    ])
});

static TODO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(TODO|FIXME|HACK|XXX)\b").expect("todo pattern is valid"));

/// A single scan finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// 1-based line number
    pub line: usize,
    pub issue: String,
}

/// Whether the file's extension is one we know how to scan
pub fn should_check_file(path: &Path) -> bool {
    if path.to_string_lossy().ends_with(".blade.php") {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CHECKABLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// A TODO-style marker not followed by a ticket reference
fn has_untracked_todo(line: &str) -> bool {
    TODO_RE.find_iter(line).any(|m| {
        let rest = line[m.end()..].trim_start();
        !rest.starts_with(|c| matches!(c, '(' | '#' | '['))
    })
}

/// Scan file contents line by line.
///
/// Comment lines are only checked for secrets; code lines report at most
/// one finding per category.
pub fn scan_content(content: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (index, line) in content.split('\n').enumerate() {
        let line_no = index + 1;
        let stripped = line.trim();

        if stripped.starts_with("//") || stripped.starts_with('#') || stripped.starts_with('*') {
            for rule in SECRET_RULES.iter() {
                if rule.pattern.is_match(line) {
                    findings.push(Finding {
                        line: line_no,
                        issue: format!("WARNING: {}", rule.description),
                    });
                }
            }
            continue;
        }

        if let Some(rule) = DEBUG_RULES.iter().find(|r| r.pattern.is_match(line)) {
            findings.push(Finding {
                line: line_no,
                issue: format!("Debug: {}", rule.description),
            });
        }

        if has_untracked_todo(line) {
            findings.push(Finding {
                line: line_no,
                issue: "TODO/FIXME without ticket reference".to_string(),
            });
        }

        if let Some(rule) = SECRET_RULES.iter().find(|r| r.pattern.is_match(line)) {
            findings.push(Finding {
                line: line_no,
                issue: format!("SECURITY: {}", rule.description),
            });
        }
    }

    findings
}

pub struct EditScanner {
    max_findings: usize,
}

impl EditScanner {
    pub fn new(max_findings: usize) -> Self {
        Self { max_findings }
    }

    /// Scan an edited file. Unsupported, missing or unreadable files yield
    /// nothing.
    pub async fn scan_file(&self, path: &Path) -> Option<Advisory> {
        if !should_check_file(path) {
            return None;
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Skipping scan of {}: {}", path.display(), e);
                return None;
            }
        };
        let content = String::from_utf8_lossy(&bytes);
        let findings = scan_content(&content);
        self.render(path, &findings)
    }

    fn render(&self, path: &Path, findings: &[Finding]) -> Option<Advisory> {
        if findings.is_empty() {
            return None;
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let mut lines = vec![format!("Post-edit scan of {}:", filename)];
        for finding in findings.iter().take(self.max_findings) {
            lines.push(format!("  line {}: {}", finding.line, finding.issue));
        }
        if findings.len() > self.max_findings {
            lines.push(format!(
                "  ... and {} more issues",
                findings.len() - self.max_findings
            ));
        }

        Some(Advisory::new(AdvisoryKind::EditScan, lines.join("\n")))
    }
}
