//! Import orchestration
//!
//! Owns the staging collection for one import run and drives the
//! pipeline over it: load, validate + duplicate detection, operator
//! resolution, commit, audit history. One service instance runs one
//! import at a time; `clear` resets it for the next run.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use tenreg_common::config::ImportSettings;
use tenreg_common::db::models::ImportHistoryEntry;

use crate::commit::CommitEngine;
use crate::dedup::DuplicateDetector;
use crate::error::{ImportError, Result};
use crate::models::manifest::ImportManifest;
use crate::models::payload;
use crate::models::record::{RecordStatus, RecordType, Resolution, StagingRecord};
use crate::models::report::{ImportReport, LoadSummary, ValidationSummary};
use crate::reader::SourceReader;
use crate::repositories::{buildings, history};
use crate::validator;

pub struct ImportService {
    pool: SqlitePool,
    reader: Arc<dyn SourceReader>,
    detector: DuplicateDetector,
    engine: CommitEngine,
    settings: ImportSettings,
    operator: String,

    staging: Vec<StagingRecord>,
    current_file: Option<PathBuf>,
    manifest: Option<ImportManifest>,
}

impl ImportService {
    pub fn new(
        pool: SqlitePool,
        reader: Arc<dyn SourceReader>,
        settings: ImportSettings,
        operator: impl Into<String>,
    ) -> Self {
        let detector = DuplicateDetector::new(pool.clone());
        let engine = CommitEngine::new(pool.clone());

        Self {
            pool,
            reader,
            detector,
            engine,
            settings,
            operator: operator.into(),
            staging: Vec::new(),
            current_file: None,
            manifest: None,
        }
    }

    /// Load and gate the import file.
    ///
    /// Fails with a specific reason (missing file, wrong extension,
    /// corrupt container, incomplete manifest) so the operator can fix
    /// the input. Does not populate the staging area.
    pub async fn load_file(&mut self, path: &Path) -> Result<LoadSummary> {
        let data = self.reader.read_file(path).await?;

        if !self.reader.validate_manifest(&data.manifest) {
            let missing = data.manifest.missing_keys();
            let reason = if data.manifest.is_empty() {
                "manifest is empty".to_string()
            } else {
                format!("missing keys: {}", missing.join(", "))
            };
            return Err(ImportError::InvalidManifest(reason));
        }

        for warning in data.manifest.vocab_warnings() {
            warn!("{}", warning);
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let declared_record_count = data.manifest.record_count.unwrap_or(0);

        info!(
            file = %file_name,
            records = declared_record_count,
            "Loaded import file"
        );

        self.current_file = Some(path.to_path_buf());
        self.manifest = Some(data.manifest.clone());

        Ok(LoadSummary {
            file_name,
            declared_record_count,
            manifest: data.manifest,
        })
    }

    /// Validate every record in the loaded file.
    ///
    /// Re-reads the file (extraction is one-pass and not cached), runs
    /// the validator and then duplicate detection on each record in
    /// extraction order, and replaces any prior staging contents. The
    /// callback fires after each record.
    pub async fn validate_all<F>(&mut self, mut progress: F) -> Result<&[StagingRecord]>
    where
        F: FnMut(usize, usize),
    {
        let path = self
            .current_file
            .clone()
            .ok_or(ImportError::NoFileLoaded)?;

        let data = self.reader.read_file(&path).await?;
        let total = data.record_count();

        self.staging.clear();

        for (i, mut record) in self.reader.extract_records(data).enumerate() {
            let verdict =
                validator::validate(&record.payload, &record.record_type, &self.settings.region);
            record.apply_verdict(verdict);

            // Infrastructure hiccups during lookup must not fail the
            // batch; the record simply stays unescalated
            if let Err(e) = self.detector.detect(&mut record).await {
                warn!(record_id = %record.record_id, error = %e, "Duplicate check unavailable");
            }

            self.staging.push(record);
            progress(i + 1, total);
        }

        self.cross_check_unit_references().await;

        info!(records = self.staging.len(), "Validation complete");

        Ok(&self.staging)
    }

    /// Flag units whose building reference matches neither a staged
    /// building nor one already in the registry
    async fn cross_check_unit_references(&mut self) {
        let staged_buildings: HashSet<String> = self
            .staging
            .iter()
            .filter(|r| r.kind() == Some(RecordType::Building))
            .filter_map(|r| payload::get_string(&r.payload, &["building_id"]))
            .collect();

        let pool = self.pool.clone();

        for record in &mut self.staging {
            if record.kind() != Some(RecordType::Unit) || record.status == RecordStatus::Error {
                continue;
            }
            let Some(building_id) = payload::get_string(&record.payload, &["building_id"]) else {
                continue;
            };
            if staged_buildings.contains(&building_id) {
                continue;
            }

            match buildings::find_by_building_id(&pool, &building_id).await {
                Ok(Some(_)) => {}
                Ok(None) => record
                    .add_warning(format!("References unknown building: {}", building_id)),
                Err(e) => {
                    warn!(record_id = %record.record_id, error = %e, "Building reference check unavailable");
                }
            }
        }
    }

    /// Counts over the current staging collection. Pure read.
    pub fn get_validation_summary(&self) -> ValidationSummary {
        let mut summary = ValidationSummary {
            total: self.staging.len(),
            ..Default::default()
        };

        for record in &self.staging {
            match record.status {
                RecordStatus::Valid => summary.valid += 1,
                RecordStatus::Warning => summary.warnings += 1,
                RecordStatus::Error => summary.errors += 1,
                RecordStatus::Duplicate => summary.duplicates += 1,
                _ => {}
            }
        }

        summary
    }

    /// Staged records currently at the given status. Pure read.
    pub fn get_records_by_status(&self, status: RecordStatus) -> Vec<&StagingRecord> {
        self.staging.iter().filter(|r| r.status == status).collect()
    }

    /// All staged records, in staged order
    pub fn records(&self) -> &[StagingRecord] {
        &self.staging
    }

    /// Record the operator's decision for one staged record.
    ///
    /// Returns false when no record with that id is staged.
    pub fn resolve_record(&mut self, record_id: &str, resolution: Resolution) -> bool {
        match self.staging.iter_mut().find(|r| r.record_id == record_id) {
            Some(record) => {
                record.resolve(resolution);
                true
            }
            None => false,
        }
    }

    /// Commit the staged set, in staged order, exactly once.
    ///
    /// Eligible records go through the commit engine; errors count as
    /// failed with their messages collected; skipped and unresolved
    /// duplicates count as skipped. Exactly one history row is written
    /// per call, and the returned report is immutable.
    pub async fn commit<F>(&mut self, mut progress: F) -> Result<ImportReport>
    where
        F: FnMut(usize, usize),
    {
        let import_id = format!("IMP-{}", Utc::now().format("%Y%m%d%H%M%S"));
        let total = self.staging.len();

        let mut imported = 0usize;
        let mut failed = 0usize;
        let mut skipped = 0usize;
        let mut warnings = 0usize;
        let mut errors: Vec<String> = Vec::new();

        for i in 0..self.staging.len() {
            let record = &mut self.staging[i];
            match record.status {
                RecordStatus::Error => {
                    failed += 1;
                    errors.extend(record.errors.iter().cloned());
                }
                RecordStatus::Valid | RecordStatus::Warning => {
                    let had_warnings = !record.warnings.is_empty();
                    if self.engine.commit_record(record).await {
                        imported += 1;
                        if had_warnings {
                            warnings += 1;
                        }
                    } else {
                        failed += 1;
                    }
                }
                // Skipped records, unresolved duplicates, and anything
                // else not admitted for commit
                _ => skipped += 1,
            }

            progress(i + 1, total);
        }

        let status = if failed == 0 {
            "completed"
        } else {
            "completed_with_errors"
        };

        let truncated: Vec<String> = errors
            .iter()
            .take(self.settings.max_reported_errors)
            .cloned()
            .collect();

        let entry = ImportHistoryEntry {
            import_id: import_id.clone(),
            file_name: self
                .current_file
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            file_path: self
                .current_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            file_hash: self
                .manifest
                .as_ref()
                .and_then(|m| m.checksum.clone())
                .unwrap_or_default(),
            import_date: Utc::now().to_rfc3339(),
            imported_by: self.operator.clone(),
            status: status.to_string(),
            total_records: total as i64,
            imported_records: imported as i64,
            failed_records: failed as i64,
            skipped_records: skipped as i64,
            warnings_count: self.staging.iter().filter(|r| !r.warnings.is_empty()).count() as i64,
            errors: truncated.clone(),
        };
        history::append(&self.pool, &entry).await?;

        info!(
            import_id = %import_id,
            imported,
            failed,
            skipped,
            "Import complete"
        );

        Ok(ImportReport {
            success: failed == 0,
            total_records: total,
            imported,
            failed,
            skipped,
            warnings,
            errors: truncated,
            import_id,
        })
    }

    /// Recent audit rows, newest first
    pub async fn import_history(&self, limit: i64) -> Result<Vec<ImportHistoryEntry>> {
        history::list_recent(&self.pool, limit).await
    }

    /// Discard staging, the current file reference, and the manifest.
    ///
    /// Must be called before starting an unrelated run; the service
    /// never auto-clears between runs.
    pub fn clear(&mut self) {
        self.staging.clear();
        self.current_file = None;
        self.manifest = None;
    }
}
