//! Staging record and its status state machine
//!
//! A staging record is one candidate entity row held in memory during
//! an import run. Status transitions are the only mutation path:
//!
//! ```text
//! pending --validate--> valid | warning | error
//! valid | warning --detect--> duplicate
//! duplicate --resolve(skip)--> skipped
//! duplicate --resolve(merge|keep_new)--> valid
//! valid | warning --commit--> imported
//! ```
//!
//! `error`, `skipped`, and `imported` are terminal.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::validator::Verdict;

/// Record status within the staging area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Valid,
    Warning,
    Error,
    Duplicate,
    Imported,
    Skipped,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Valid => "valid",
            RecordStatus::Warning => "warning",
            RecordStatus::Error => "error",
            RecordStatus::Duplicate => "duplicate",
            RecordStatus::Imported => "imported",
            RecordStatus::Skipped => "skipped",
        }
    }
}

/// Entity kinds carried by a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Building,
    Unit,
    Person,
    Claim,
}

impl RecordType {
    /// All kinds, in container table order
    pub const ALL: [RecordType; 4] = [
        RecordType::Building,
        RecordType::Unit,
        RecordType::Person,
        RecordType::Claim,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Building => "building",
            RecordType::Unit => "unit",
            RecordType::Person => "person",
            RecordType::Claim => "claim",
        }
    }

    /// Container table holding this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            RecordType::Building => "buildings",
            RecordType::Unit => "units",
            RecordType::Person => "persons",
            RecordType::Claim => "claims",
        }
    }

    /// Parse a source type tag; `None` for unknown tags
    pub fn parse(tag: &str) -> Option<RecordType> {
        match tag {
            "building" => Some(RecordType::Building),
            "unit" => Some(RecordType::Unit),
            "person" => Some(RecordType::Person),
            "claim" => Some(RecordType::Claim),
            _ => None,
        }
    }
}

/// Operator decision on a duplicate record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Merge,
    KeepExisting,
    KeepNew,
    Skip,
}

impl Resolution {
    pub fn parse(tag: &str) -> Option<Resolution> {
        match tag {
            "merge" => Some(Resolution::Merge),
            "keep_existing" => Some(Resolution::KeepExisting),
            "keep_new" => Some(Resolution::KeepNew),
            "skip" => Some(Resolution::Skip),
            _ => None,
        }
    }
}

/// A record in the import staging area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingRecord {
    /// Unique within one import run
    pub record_id: String,

    /// Source type tag, kept in the container's own spelling
    pub record_type: String,

    /// Candidate field values in the source's native key casing
    pub payload: Map<String, serde_json::Value>,

    pub status: RecordStatus,

    /// Non-empty exactly when status is `Error`
    pub errors: Vec<String>,

    /// Advisory findings; legal alongside valid, warning, and duplicate
    pub warnings: Vec<String>,

    /// Natural key of the pre-existing record this one collides with
    pub duplicate_of: Option<String>,

    pub resolution: Option<Resolution>,
}

impl StagingRecord {
    pub fn new(
        record_id: String,
        record_type: String,
        payload: Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            record_id,
            record_type,
            payload,
            status: RecordStatus::Pending,
            errors: Vec::new(),
            warnings: Vec::new(),
            duplicate_of: None,
            resolution: None,
        }
    }

    /// Typed kind, when the source tag is one we understand
    pub fn kind(&self) -> Option<RecordType> {
        RecordType::parse(&self.record_type)
    }

    /// Apply a validation verdict: pending -> valid | warning | error
    pub fn apply_verdict(&mut self, verdict: Verdict) {
        self.errors = verdict.errors;
        self.warnings = verdict.warnings;
        self.status = if !self.errors.is_empty() {
            RecordStatus::Error
        } else if !self.warnings.is_empty() {
            RecordStatus::Warning
        } else {
            RecordStatus::Valid
        };
    }

    /// Escalate a non-error record to duplicate
    ///
    /// Error records are left alone; detection only ever escalates.
    pub fn mark_duplicate(&mut self, existing_key: String, warning: String) {
        if matches!(self.status, RecordStatus::Valid | RecordStatus::Warning) {
            self.status = RecordStatus::Duplicate;
            self.duplicate_of = Some(existing_key);
            self.warnings.push(warning);
        }
    }

    /// Append an advisory warning, escalating valid to warning
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
        if self.status == RecordStatus::Valid {
            self.status = RecordStatus::Warning;
        }
    }

    /// Record the operator's duplicate resolution
    ///
    /// `skip` is terminal; `merge` and `keep_new` re-admit the record
    /// for commit; `keep_existing` leaves the status at duplicate so
    /// the commit pass counts it as skipped.
    pub fn resolve(&mut self, resolution: Resolution) {
        self.resolution = Some(resolution);
        match resolution {
            Resolution::Skip => self.status = RecordStatus::Skipped,
            Resolution::Merge | Resolution::KeepNew => self.status = RecordStatus::Valid,
            Resolution::KeepExisting => {}
        }
    }

    /// Only valid and warning records may be committed
    pub fn is_committable(&self) -> bool {
        matches!(self.status, RecordStatus::Valid | RecordStatus::Warning)
    }

    /// Terminal transition after a successful persistence write
    pub fn mark_imported(&mut self) {
        if self.is_committable() {
            self.status = RecordStatus::Imported;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StagingRecord {
        StagingRecord::new("REC-0001".into(), "building".into(), Map::new())
    }

    #[test]
    fn verdict_with_errors_sets_error_status() {
        let mut rec = record();
        rec.apply_verdict(Verdict {
            errors: vec!["Building ID is required".into()],
            warnings: vec![],
        });
        assert_eq!(rec.status, RecordStatus::Error);
        assert!(!rec.errors.is_empty());
    }

    #[test]
    fn errors_nonempty_iff_status_error() {
        let mut clean = record();
        clean.apply_verdict(Verdict::default());
        assert_eq!(clean.status, RecordStatus::Valid);
        assert!(clean.errors.is_empty());

        let mut advisory = record();
        advisory.apply_verdict(Verdict {
            errors: vec![],
            warnings: vec!["Floor number seems unusual".into()],
        });
        assert_eq!(advisory.status, RecordStatus::Warning);
        assert!(advisory.errors.is_empty());
    }

    #[test]
    fn duplicate_escalation_skips_error_records() {
        let mut rec = record();
        rec.apply_verdict(Verdict {
            errors: vec!["bad".into()],
            warnings: vec![],
        });
        rec.mark_duplicate("01-01-01-001-001-00001".into(), "collision".into());
        assert_eq!(rec.status, RecordStatus::Error);
        assert!(rec.duplicate_of.is_none());
    }

    #[test]
    fn resolve_skip_is_terminal() {
        let mut rec = record();
        rec.apply_verdict(Verdict::default());
        rec.mark_duplicate("existing".into(), "collision".into());
        rec.resolve(Resolution::Skip);
        assert_eq!(rec.status, RecordStatus::Skipped);
    }

    #[test]
    fn resolve_merge_readmits_for_commit() {
        let mut rec = record();
        rec.apply_verdict(Verdict {
            errors: vec![],
            warnings: vec!["advisory".into()],
        });
        rec.mark_duplicate("existing".into(), "collision".into());
        rec.resolve(Resolution::Merge);
        assert_eq!(rec.status, RecordStatus::Valid);
        assert!(rec.is_committable());
    }

    #[test]
    fn resolve_keep_existing_stays_duplicate() {
        let mut rec = record();
        rec.apply_verdict(Verdict::default());
        rec.mark_duplicate("existing".into(), "collision".into());
        rec.resolve(Resolution::KeepExisting);
        assert_eq!(rec.status, RecordStatus::Duplicate);
        assert_eq!(rec.resolution, Some(Resolution::KeepExisting));
    }
}
