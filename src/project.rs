//! Project context for scoping learnings and locating stores
//!
//! Hooks run in the project directory. The project name used to scope
//! learnings is that directory's name; stores live under it.

use std::env;
use std::path::{Path, PathBuf};

/// Fallback name when the directory has no usable final component
pub const UNKNOWN_PROJECT: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Directory the stores are resolved against
    pub root: PathBuf,

    /// Name recorded on captured learnings
    pub name: String,
}

impl ProjectContext {
    /// Context for the current working directory
    pub fn current() -> Self {
        Self::from_dir(env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let root = dir.as_ref().to_path_buf();
        let name = project_name(&root);
        Self { root, name }
    }
}

/// Final path component of `dir`, resolving `.`-style paths first
pub fn project_name(dir: &Path) -> String {
    let resolved = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_PROJECT.to_string())
}
