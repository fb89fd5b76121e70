//! Run-level summaries and the final import report

use serde::{Deserialize, Serialize};

use crate::models::manifest::ImportManifest;

/// What `load_file` learned about the container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSummary {
    pub file_name: String,
    pub declared_record_count: i64,
    pub manifest: ImportManifest,
}

/// Counts over the current staging collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub warnings: usize,
    pub errors: usize,
    pub duplicates: usize,
}

/// Result of one commit run, immutable once produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// True when no record failed
    pub success: bool,

    pub total_records: usize,
    pub imported: usize,
    pub failed: usize,
    pub skipped: usize,

    /// Records imported despite advisory warnings
    pub warnings: usize,

    /// First few error strings, for display; the failed count carries
    /// the full tally
    pub errors: Vec<String>,

    /// Run identifier of the form IMP-<timestamp>
    pub import_id: String,
}
