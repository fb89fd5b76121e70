//! Record validation
//!
//! Pure field-presence and format rules per entity kind. No I/O: the
//! same payload and kind always produce the same verdict, apart from
//! the year-of-birth upper bound which follows the wall clock.

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tenreg_common::config::RegionalBounds;

use crate::models::payload::{self, Payload};
use crate::models::record::RecordType;

/// Composite building key: governorate-district-subdistrict-community-
/// neighborhood-building digit groups
static BUILDING_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-\d{2}-\d{2}-\d{3}-\d{3}-\d{5}$").unwrap());

/// National ID: exactly 11 digits
static NATIONAL_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{11}$").unwrap());

/// Regional mobile format, after stripping spaces and dashes
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\+963|0)?9\d{8}$").unwrap());

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Outcome of validating a single payload
#[derive(Debug, Clone, Default)]
pub struct Verdict {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate one payload against the rules for its kind.
///
/// `record_type` is the source's own tag; an unrecognized tag is a
/// hard error, never silently accepted.
pub fn validate(payload: &Payload, record_type: &str, region: &RegionalBounds) -> Verdict {
    let mut verdict = Verdict::default();

    match RecordType::parse(record_type) {
        Some(RecordType::Building) => validate_building(payload, region, &mut verdict),
        Some(RecordType::Unit) => validate_unit(payload, &mut verdict),
        Some(RecordType::Person) => validate_person(payload, &mut verdict),
        Some(RecordType::Claim) => validate_claim(payload, &mut verdict),
        None => verdict
            .errors
            .push(format!("Unknown record type: {}", record_type)),
    }

    verdict
}

fn validate_building(payload: &Payload, region: &RegionalBounds, verdict: &mut Verdict) {
    // Building ID is optional here, but when present it must match the
    // composite pattern exactly
    if let Some(building_id) = payload::get_string(payload, &["building_id"]) {
        if !BUILDING_ID_RE.is_match(&building_id) {
            verdict.errors.push(format!(
                "Invalid building ID format: {} (expected XX-XX-XX-XXX-XXX-XXXXX)",
                building_id
            ));
        }
    }

    for (keys, label) in [
        (&["governorate_code"][..], "Governorate code"),
        (&["district_code"][..], "District code"),
        (&["subdistrict_code", "sub_district_code"][..], "Subdistrict code"),
        (&["community_code"][..], "Community code"),
        (&["neighborhood_code", "neighbourhood_code"][..], "Neighborhood code"),
    ] {
        if !payload::is_present(payload, keys) {
            verdict.errors.push(format!("{} is required", label));
        }
    }

    let latitude = coordinate(payload, &["latitude", "geo_latitude", "lat"], "Latitude", -90.0, 90.0, verdict);
    let longitude = coordinate(payload, &["longitude", "geo_longitude", "lon", "lng"], "Longitude", -180.0, 180.0, verdict);

    // Soft geofence: plausible on Earth but outside the campaign area
    if let (Some(lat), Some(lon)) = (latitude, longitude) {
        if lat.abs() <= 90.0 && lon.abs() <= 180.0 && !region.contains(lat, lon) {
            verdict
                .warnings
                .push("Coordinates outside expected region".to_string());
        }
    }
}

/// Parse and hard-range-check one coordinate; returns the value for
/// the soft geofence check
fn coordinate(
    payload: &Payload,
    keys: &[&str],
    label: &str,
    min: f64,
    max: f64,
    verdict: &mut Verdict,
) -> Option<f64> {
    if !payload::is_present(payload, keys) {
        return None;
    }

    match payload::get_f64(payload, keys) {
        Some(value) => {
            if value < min || value > max {
                verdict.errors.push(format!(
                    "{} must be between {} and {}",
                    label, min, max
                ));
            }
            Some(value)
        }
        None => {
            verdict.errors.push(format!("Invalid {} value", label.to_lowercase()));
            None
        }
    }
}

fn validate_unit(payload: &Payload, verdict: &mut Verdict) {
    if !payload::is_present(payload, &["building_id"]) {
        verdict.errors.push("Building ID is required".to_string());
    }

    if !payload::is_present(payload, &["unit_type"]) {
        verdict.errors.push("Unit type is required".to_string());
    }

    if let Some(floor) = payload::get_i64(payload, &["floor_number", "floor"]) {
        if !(-5..=50).contains(&floor) {
            verdict
                .warnings
                .push("Floor number seems unusual".to_string());
        }
    }
}

fn validate_person(payload: &Payload, verdict: &mut Verdict) {
    if !payload::is_present(payload, &["first_name", "first_name_ar"]) {
        verdict
            .errors
            .push("First name (English or Arabic) is required".to_string());
    }

    if !payload::is_present(payload, &["last_name", "last_name_ar"]) {
        verdict
            .errors
            .push("Last name (English or Arabic) is required".to_string());
    }

    if let Some(national_id) = payload::get_string(payload, &["national_id"]) {
        let cleaned: String = national_id
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if !NATIONAL_ID_RE.is_match(&cleaned) {
            verdict
                .errors
                .push("National ID must be 11 digits".to_string());
        }
    }

    // Contact data is advisory: a malformed phone or email never
    // blocks the record
    if let Some(phone) = payload::get_string(payload, &["mobile_number", "phone_number", "phone"]) {
        let cleaned: String = phone
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if !PHONE_RE.is_match(&cleaned) {
            verdict
                .warnings
                .push("Phone number may not be in a valid regional format".to_string());
        }
    }

    if let Some(email) = payload::get_string(payload, &["email"]) {
        if !EMAIL_RE.is_match(&email) {
            verdict
                .warnings
                .push(format!("Email address looks malformed: {}", email));
        }
    }

    if payload::is_present(payload, &["year_of_birth"]) {
        let current_year = i64::from(Utc::now().year());
        match payload::get_i64(payload, &["year_of_birth"]) {
            Some(year) if (1900..=current_year).contains(&year) => {}
            _ => verdict.errors.push(format!(
                "Year of birth must be between 1900 and {}",
                current_year
            )),
        }
    }
}

fn validate_claim(payload: &Payload, verdict: &mut Verdict) {
    if !payload::is_present(payload, &["unit_id", "property_unit_id"]) {
        verdict.errors.push("Property unit is required".to_string());
    }

    let claimants = payload::get_string_list(payload, &["claimant_ids", "person_ids", "claimant_id"]);
    if claimants.is_empty() {
        verdict
            .errors
            .push("At least one claimant is required".to_string());
    }
}
