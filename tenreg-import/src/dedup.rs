//! Duplicate detection against the live registry
//!
//! Property duplicates are keyed by building ID or by the
//! (building ID, unit number) composite; person duplicates by national
//! ID. Detection only ever escalates a non-error record to duplicate,
//! it never validates or invalidates.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::models::payload;
use crate::models::record::{RecordType, StagingRecord};
use crate::repositories::{buildings, persons, units};

/// Looks up staged records by natural key in the registry
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    pool: SqlitePool,
}

impl DuplicateDetector {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Escalate the record to duplicate when its natural key already
    /// exists. Error records and kinds without a duplicate rule
    /// (claims) pass through untouched.
    pub async fn detect(&self, record: &mut StagingRecord) -> Result<()> {
        if !record.is_committable() {
            return Ok(());
        }

        let existing_key = match record.kind() {
            Some(RecordType::Building) => self.existing_building(record).await?,
            Some(RecordType::Unit) => self.existing_unit(record).await?,
            Some(RecordType::Person) => self.existing_person(record).await?,
            _ => None,
        };

        if let Some(key) = existing_key {
            debug!(record_id = %record.record_id, existing = %key, "Duplicate detected");
            let warning = format!("A record with the same identifier already exists: {}", key);
            record.mark_duplicate(key, warning);
        }

        Ok(())
    }

    async fn existing_building(&self, record: &StagingRecord) -> Result<Option<String>> {
        let Some(building_id) = payload::get_string(&record.payload, &["building_id"]) else {
            return Ok(None);
        };

        Ok(buildings::find_by_building_id(&self.pool, &building_id)
            .await?
            .map(|existing| existing.building_id))
    }

    async fn existing_unit(&self, record: &StagingRecord) -> Result<Option<String>> {
        let Some(building_id) = payload::get_string(&record.payload, &["building_id"]) else {
            return Ok(None);
        };
        let Some(unit_number) =
            payload::get_string(&record.payload, &["unit_number", "apartment_number"])
        else {
            return Ok(None);
        };

        Ok(units::find_by_composite(&self.pool, &building_id, &unit_number)
            .await?
            .map(|existing| format!("{}:{}", existing.building_id, unit_number)))
    }

    async fn existing_person(&self, record: &StagingRecord) -> Result<Option<String>> {
        let Some(national_id) = payload::get_string(&record.payload, &["national_id"]) else {
            return Ok(None);
        };

        Ok(persons::find_by_national_id(&self.pool, &national_id)
            .await?
            .and_then(|existing| existing.national_id))
    }
}
