//! Error types for the pro-workflow hook engine
//!
//! This module provides error handling using thiserror for structured error
//! definitions and anyhow for error propagation. Almost every error in this
//! crate ends up logged and swallowed by the hook engine: the host event must
//! never fail because of us.

use thiserror::Error;

/// Main error type for pro-workflow operations
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// I/O error (store files, transcripts, scanned sources)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML configuration could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration values rejected by validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Hook payload did not match the expected shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An enrichment provider failed or returned unusable output
    #[error("Enrichment provider '{provider}' failed: {reason}")]
    Enrichment { provider: String, reason: String },

    /// An external call exceeded its time budget
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for pro-workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Convert anyhow::Error to WorkflowError
impl From<anyhow::Error> for WorkflowError {
    fn from(err: anyhow::Error) -> Self {
        WorkflowError::Other(err.to_string())
    }
}
