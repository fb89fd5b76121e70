//! Commit engine
//!
//! Writes eligible staged records into the registry through the entity
//! repositories. Producers disagree on field spellings, so each
//! canonical field has an ordered list of acceptable source keys;
//! downstream code never branches on spelling again.
//!
//! A persistence failure is contained at the per-record boundary: it
//! is logged and reported as a countable failure, and the batch moves
//! on. One bad record never aborts a run.

use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use tenreg_common::db::models::{Building, Claim, Person, PropertyUnit};

use crate::error::Result;
use crate::models::payload::{self, Payload};
use crate::models::record::{RecordType, StagingRecord};
use crate::repositories::{buildings, claims, persons, units};

// Alternate-key tables: canonical field -> acceptable source keys, in
// preference order
const BUILDING_ID_KEYS: &[&str] = &["building_id"];
const SUBDISTRICT_KEYS: &[&str] = &["subdistrict_code", "sub_district_code"];
const NEIGHBORHOOD_KEYS: &[&str] = &["neighborhood_code", "neighbourhood_code"];
const LATITUDE_KEYS: &[&str] = &["latitude", "geo_latitude", "lat"];
const LONGITUDE_KEYS: &[&str] = &["longitude", "geo_longitude", "lon", "lng"];
const UNIT_NUMBER_KEYS: &[&str] = &["unit_number", "apartment_number"];
const FLOOR_KEYS: &[&str] = &["floor_number", "floor"];
const OCCUPANCY_KEYS: &[&str] = &["occupancy_status", "apartment_status"];
const DESCRIPTION_KEYS: &[&str] = &["property_description", "description"];
const LAST_NAME_KEYS: &[&str] = &["last_name", "family_name"];
const PHONE_KEYS: &[&str] = &["phone_number", "phone"];
const MOBILE_KEYS: &[&str] = &["mobile_number", "mobile"];
const CLAIM_UNIT_KEYS: &[&str] = &["unit_id", "property_unit_id"];
const CLAIMANT_KEYS: &[&str] = &["claimant_ids", "person_ids", "claimant_id"];

/// Persists eligible staged records
#[derive(Debug, Clone)]
pub struct CommitEngine {
    pool: SqlitePool,
}

impl CommitEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Commit one record.
    ///
    /// Only `valid` and `warning` records are eligible; any other
    /// status returns false without side effects, so calling this
    /// twice on an error or already-imported record is always safe.
    /// Returns true and flips the record to `imported` on a
    /// successful write.
    pub async fn commit_record(&self, record: &mut StagingRecord) -> bool {
        if !record.is_committable() {
            return false;
        }

        let outcome = match record.kind() {
            Some(RecordType::Building) => self.commit_building(&record.payload).await,
            Some(RecordType::Unit) => self.commit_unit(&record.payload).await,
            Some(RecordType::Person) => self.commit_person(&record.payload).await,
            Some(RecordType::Claim) => self.commit_claim(&record.payload).await,
            None => {
                warn!(
                    record_id = %record.record_id,
                    record_type = %record.record_type,
                    "Cannot commit record of unknown type"
                );
                return false;
            }
        };

        match outcome {
            Ok(()) => {
                record.mark_imported();
                true
            }
            Err(e) => {
                warn!(
                    record_id = %record.record_id,
                    record_type = %record.record_type,
                    error = %e,
                    "Record commit failed"
                );
                false
            }
        }
    }

    async fn commit_building(&self, p: &Payload) -> Result<()> {
        let building = Building {
            building_id: payload::get_string(p, BUILDING_ID_KEYS)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            governorate_code: payload::get_string(p, &["governorate_code"]),
            district_code: payload::get_string(p, &["district_code"]),
            subdistrict_code: payload::get_string(p, SUBDISTRICT_KEYS),
            community_code: payload::get_string(p, &["community_code"]),
            neighborhood_code: payload::get_string(p, NEIGHBORHOOD_KEYS),
            building_type: payload::get_string(p, &["building_type"]),
            building_status: payload::get_string(p, &["building_status", "structure_status"]),
            floors_count: payload::get_i64(p, &["floors_count"]),
            units_count: payload::get_i64(p, &["units_count"]),
            latitude: payload::get_f64(p, LATITUDE_KEYS),
            longitude: payload::get_f64(p, LONGITUDE_KEYS),
        };

        buildings::create(&self.pool, &building).await
    }

    async fn commit_unit(&self, p: &Payload) -> Result<()> {
        let unit = PropertyUnit {
            unit_id: payload::get_string(p, &["unit_id"])
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            building_id: payload::get_string(p, BUILDING_ID_KEYS).unwrap_or_default(),
            unit_number: payload::get_string(p, UNIT_NUMBER_KEYS),
            unit_type: payload::get_string(p, &["unit_type"]),
            floor_number: payload::get_i64(p, FLOOR_KEYS),
            occupancy_status: payload::get_string(p, OCCUPANCY_KEYS),
            property_description: payload::get_string(p, DESCRIPTION_KEYS),
        };

        units::create(&self.pool, &unit).await
    }

    async fn commit_person(&self, p: &Payload) -> Result<()> {
        let person = Person {
            person_id: payload::get_string(p, &["person_id"])
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            national_id: payload::get_string(p, &["national_id"]),
            first_name: payload::get_string(p, &["first_name"]),
            first_name_ar: payload::get_string(p, &["first_name_ar"]),
            last_name: payload::get_string(p, LAST_NAME_KEYS),
            last_name_ar: payload::get_string(p, &["last_name_ar"]),
            father_name: payload::get_string(p, &["father_name"]),
            mother_name: payload::get_string(p, &["mother_name"]),
            gender: payload::get_string(p, &["gender"]),
            year_of_birth: year_of_birth(p),
            phone_number: payload::get_string(p, PHONE_KEYS),
            mobile_number: payload::get_string(p, MOBILE_KEYS),
            email: payload::get_string(p, &["email"]),
        };

        persons::create(&self.pool, &person).await
    }

    async fn commit_claim(&self, p: &Payload) -> Result<()> {
        let claim = Claim {
            claim_id: claims::next_claim_id(&self.pool).await?,
            unit_id: payload::get_string(p, CLAIM_UNIT_KEYS).unwrap_or_default(),
            claimant_ids: payload::get_string_list(p, CLAIMANT_KEYS),
            claim_type: payload::get_string(p, &["claim_type"]).or(Some("ownership".into())),
            status: payload::get_string(p, &["status", "case_status"]).or(Some("submitted".into())),
            source: payload::get_string(p, &["source"]).or(Some("FIELD_COLLECTION".into())),
        };

        claims::create(&self.pool, &claim).await
    }
}

/// Year of birth, either direct or derived from a full date of birth
fn year_of_birth(p: &Payload) -> Option<i64> {
    payload::get_i64(p, &["year_of_birth"]).or_else(|| {
        let date = payload::get_string(p, &["date_of_birth"])?;
        date.get(..4)?.parse().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::RecordStatus;
    use crate::validator::Verdict;
    use serde_json::json;
    use sqlx::Row;
    use tenreg_common::db::init::create_schema;

    async fn pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        create_schema(&pool).await.expect("schema");
        pool
    }

    fn staged(record_type: &str, pairs: &[(&str, serde_json::Value)]) -> StagingRecord {
        let payload = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let mut record = StagingRecord::new("REC-0001".into(), record_type.into(), payload);
        record.apply_verdict(Verdict::default());
        record
    }

    #[tokio::test]
    async fn ineligible_records_are_a_no_op() {
        let pool = pool().await;
        let engine = CommitEngine::new(pool.clone());

        let mut record = staged("person", &[("first_name", json!("Amal"))]);
        record.status = RecordStatus::Error;
        record.errors.push("bad".into());

        // Twice, deliberately: repeat calls must stay side-effect free
        assert!(!engine.commit_record(&mut record).await);
        assert!(!engine.commit_record(&mut record).await);
        assert_eq!(record.status, RecordStatus::Error);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM persons")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn skipped_and_imported_records_are_not_recommitted() {
        let pool = pool().await;
        let engine = CommitEngine::new(pool.clone());

        for status in [RecordStatus::Skipped, RecordStatus::Imported] {
            let mut record = staged("building", &[("building_id", json!("01-01-01-001-001-00001"))]);
            record.status = status;
            assert!(!engine.commit_record(&mut record).await);
            assert_eq!(record.status, status);
        }
    }

    #[tokio::test]
    async fn legacy_spellings_map_to_canonical_columns() {
        let pool = pool().await;
        let engine = CommitEngine::new(pool.clone());

        let mut record = staged(
            "unit",
            &[
                ("building_id", json!("01-01-01-001-001-00001")),
                ("apartment_number", json!("012")),
                ("unit_type", json!("apartment")),
                ("apartment_status", json!("occupied")),
            ],
        );

        assert!(engine.commit_record(&mut record).await);
        assert_eq!(record.status, RecordStatus::Imported);

        let row = sqlx::query("SELECT unit_number, occupancy_status FROM property_units")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("unit_number"), "012");
        assert_eq!(row.get::<String, _>("occupancy_status"), "occupied");
    }

    #[tokio::test]
    async fn year_of_birth_derives_from_date_of_birth() {
        let pool = pool().await;
        let engine = CommitEngine::new(pool.clone());

        let mut record = staged(
            "person",
            &[
                ("first_name", json!("Amal")),
                ("last_name", json!("Shami")),
                ("date_of_birth", json!("1985-04-12")),
            ],
        );

        assert!(engine.commit_record(&mut record).await);

        let year: i64 = sqlx::query_scalar("SELECT year_of_birth FROM persons")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(year, 1985);
    }

    #[tokio::test]
    async fn constraint_violation_is_a_countable_failure() {
        let pool = pool().await;
        let engine = CommitEngine::new(pool.clone());

        let mut first = staged(
            "person",
            &[
                ("person_id", json!("P-0001")),
                ("first_name", json!("Amal")),
                ("last_name", json!("Shami")),
                ("national_id", json!("12345678901")),
            ],
        );
        let mut second = staged(
            "person",
            &[
                ("person_id", json!("P-0001")),
                ("first_name", json!("Omar")),
                ("last_name", json!("Halabi")),
                ("national_id", json!("98765432109")),
            ],
        );

        assert!(engine.commit_record(&mut first).await);
        // Same person_id again: primary key rejects, engine contains the
        // failure and leaves the record in its prior status
        assert!(!engine.commit_record(&mut second).await);
        assert_eq!(second.status, RecordStatus::Valid);
        assert!(second.errors.is_empty());
    }

    #[tokio::test]
    async fn natural_key_collision_overwrites_for_keep_new() {
        let pool = pool().await;
        let engine = CommitEngine::new(pool.clone());

        let mut original = staged(
            "building",
            &[
                ("building_id", json!("01-01-01-001-001-00001")),
                ("building_status", json!("intact")),
            ],
        );
        assert!(engine.commit_record(&mut original).await);

        // A re-admitted duplicate replaces the stored field values
        let mut replacement = staged(
            "building",
            &[
                ("building_id", json!("01-01-01-001-001-00001")),
                ("building_status", json!("major_damage")),
            ],
        );
        assert!(engine.commit_record(&mut replacement).await);

        let status: String =
            sqlx::query_scalar("SELECT building_status FROM buildings WHERE building_id = ?")
                .bind("01-01-01-001-001-00001")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "major_damage");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buildings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn claim_ids_come_from_a_per_year_sequence() {
        let pool = pool().await;
        let engine = CommitEngine::new(pool.clone());

        for _ in 0..2 {
            let mut record = staged(
                "claim",
                &[("unit_id", json!("U-1")), ("person_ids", json!(["P-1"]))],
            );
            assert!(engine.commit_record(&mut record).await);
        }

        let ids: Vec<String> = sqlx::query_scalar("SELECT claim_id FROM claims ORDER BY claim_id")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids[0].ends_with("-000001"));
        assert!(ids[1].ends_with("-000002"));
    }
}
