//! Hook engine configuration
//!
//! Defines the thresholds used by the detectors, the storage layout and the
//! enrichment commands. Every default matches the behavior the hooks have
//! always had; a `.claude/pro-workflow.toml` file may override any of them.

use crate::error::{Result, WorkflowError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Config file location relative to the project root
pub const CONFIG_FILE: &str = ".claude/pro-workflow.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub drift: DriftConfig,
    pub correction: CorrectionConfig,
    pub learning: LearningConfig,
    pub session: SessionConfig,
    pub enrichment: EnrichmentConfig,
    pub storage: StorageConfig,
}

/// Drift detection thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Prompts that must have been seen before drift is evaluated
    pub min_prompts: u64,

    /// Edits that must have been made before drift is evaluated
    pub min_edits: u64,

    /// Relevance percentage below which a warning is emitted
    pub relevance_threshold: f64,

    /// Original keywords echoed back in a warning
    pub max_keywords_shown: usize,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            min_prompts: 6,
            min_edits: 6,
            relevance_threshold: 20.0,
            max_keywords_shown: 8,
        }
    }
}

/// Correction tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    pub enabled: bool,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Learning capture and recall
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Transcript lines scanned for annotations on each stop
    pub transcript_tail_lines: usize,

    /// Characters after an annotation searched for Mistake/Correction fields
    pub annotation_lookahead: usize,

    /// Learnings surfaced at session start
    pub top_n: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            transcript_tail_lines: 50,
            annotation_lookahead: 200,
            top_n: 10,
        }
    }
}

/// Session bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Emit a wrap-up reminder every N responses
    pub reminder_interval: u64,

    /// Maximum findings printed by the post-edit scan
    pub max_scan_findings: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reminder_interval: 20,
            max_scan_findings: 10,
        }
    }
}

/// An external command used as an enrichment provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Display name used in logs
    pub name: String,

    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Hard time budget for the command (in seconds)
    #[serde(with = "serde_duration", default = "default_command_timeout")]
    pub timeout: Duration,
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Enrichment providers, tried in the listed order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Commands asked for a one-word agent name
    pub agent_name: Vec<CommandSpec>,

    /// Commands asked for a completion message
    pub completion: Vec<CommandSpec>,

    /// Speech command; the message is appended as the last argument
    pub tts: Option<CommandSpec>,
}

/// Where the persistent records live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Learnings and session records, relative to the project root
    pub data_dir: PathBuf,

    /// Drift records; the system temp directory when unset
    pub drift_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".claude").join("data"),
            drift_dir: None,
        }
    }
}

impl StorageConfig {
    pub fn learnings_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.data_dir)
    }

    pub fn sessions_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.data_dir).join("sessions")
    }

    pub fn drift_dir(&self, project_root: &Path) -> PathBuf {
        match &self.drift_dir {
            Some(dir) => project_root.join(dir),
            None => std::env::temp_dir().join("pro-workflow"),
        }
    }
}

// Durations are written as whole seconds
mod serde_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl WorkflowConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: WorkflowConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.claude/pro-workflow.toml` under `project_root`, falling back
    /// to defaults when the file is absent or unusable.
    pub fn load_or_default(project_root: &Path) -> Self {
        let path = project_root.join(CONFIG_FILE);
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let threshold = self.drift.relevance_threshold;
        if !(threshold > 0.0 && threshold <= 100.0) {
            return Err(WorkflowError::Config(
                "drift.relevance_threshold must be in (0, 100]".to_string(),
            ));
        }

        if self.learning.top_n == 0 {
            return Err(WorkflowError::Config(
                "learning.top_n must be at least 1".to_string(),
            ));
        }

        if self.session.reminder_interval == 0 {
            return Err(WorkflowError::Config(
                "session.reminder_interval must be at least 1".to_string(),
            ));
        }

        let commands = self
            .enrichment
            .agent_name
            .iter()
            .chain(self.enrichment.completion.iter())
            .chain(self.enrichment.tts.iter());
        for spec in commands {
            if spec.timeout.is_zero() {
                return Err(WorkflowError::Config(format!(
                    "enrichment command '{}': timeout must be at least 1 second",
                    spec.name
                )));
            }
        }

        Ok(())
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| WorkflowError::Config(e.to_string()))
    }
}
