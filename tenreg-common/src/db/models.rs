//! Entity models persisted by the registry
//!
//! These are the canonical forms the import pipeline's commit engine
//! constructs; the field names match the table columns one to one.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Building {
    pub building_id: String,
    pub governorate_code: Option<String>,
    pub district_code: Option<String>,
    pub subdistrict_code: Option<String>,
    pub community_code: Option<String>,
    pub neighborhood_code: Option<String>,
    pub building_type: Option<String>,
    pub building_status: Option<String>,
    pub floors_count: Option<i64>,
    pub units_count: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyUnit {
    pub unit_id: String,
    pub building_id: String,
    pub unit_number: Option<String>,
    pub unit_type: Option<String>,
    pub floor_number: Option<i64>,
    pub occupancy_status: Option<String>,
    pub property_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    pub person_id: String,
    pub national_id: Option<String>,
    pub first_name: Option<String>,
    pub first_name_ar: Option<String>,
    pub last_name: Option<String>,
    pub last_name_ar: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub gender: Option<String>,
    pub year_of_birth: Option<i64>,
    pub phone_number: Option<String>,
    pub mobile_number: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub unit_id: String,
    pub claimant_ids: Vec<String>,
    pub claim_type: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
}

/// One append-only audit row per completed import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportHistoryEntry {
    pub import_id: String,
    pub file_name: String,
    pub file_path: String,
    pub file_hash: String,
    pub import_date: String,
    pub imported_by: String,
    pub status: String,
    pub total_records: i64,
    pub imported_records: i64,
    pub failed_records: i64,
    pub skipped_records: i64,
    pub warnings_count: i64,
    pub errors: Vec<String>,
}
