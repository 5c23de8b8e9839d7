//! Heuristic detectors run against hook events
//!
//! Each detector reads and mutates session-scoped records and returns at most
//! one advisory. None of them can fail: storage problems degrade to "no
//! advisory".

pub mod correction;
pub mod drift;
pub mod edit_scan;
pub mod reminder;

pub use correction::{is_correction, CorrectionDetector};
pub use drift::{DriftDetector, DriftWarning};
pub use edit_scan::{is_edit_tool, scan_content, EditScanner, Finding};
pub use reminder::WrapUpReminder;
