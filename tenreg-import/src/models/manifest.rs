//! Container manifest
//!
//! The manifest is the header section of an import container: what it
//! holds and which device produced it. It is parsed once per load and
//! held for the duration of one run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Vocabulary major version the registry currently understands
const SUPPORTED_VOCAB_MAJOR: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportManifest {
    pub version: Option<String>,
    pub created_at: Option<String>,
    pub record_count: Option<i64>,
    pub checksum: Option<String>,

    /// Controlled-vocabulary versions on the producing device
    pub vocab_versions: BTreeMap<String, String>,

    pub device_id: Option<String>,
    pub collector_id: Option<String>,
}

impl ImportManifest {
    /// Build a manifest from the container's key/value table.
    ///
    /// Values are stored as text, optionally JSON-encoded (the
    /// vocabulary map always is). Creation time is accepted under
    /// either of the producer generations' key spellings.
    pub fn from_key_values(pairs: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            pairs
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let vocab_versions = get("vocab_versions")
            .and_then(|raw| serde_json::from_str::<BTreeMap<String, String>>(&raw).ok())
            .unwrap_or_default();

        Self {
            version: get("version").or_else(|| get("schema_version")),
            created_at: get("created_at").or_else(|| get("created_utc")),
            record_count: get("record_count").and_then(|v| v.parse().ok()),
            checksum: get("checksum"),
            vocab_versions,
            device_id: get("device_id"),
            collector_id: get("collector_id"),
        }
    }

    /// True when the source key/value table carried nothing usable
    pub fn is_empty(&self) -> bool {
        self.version.is_none()
            && self.created_at.is_none()
            && self.record_count.is_none()
            && self.checksum.is_none()
            && self.vocab_versions.is_empty()
            && self.device_id.is_none()
            && self.collector_id.is_none()
    }

    /// Completeness gate: version, creation time, record count, and
    /// checksum must all be present for the load to proceed.
    pub fn is_complete(&self) -> bool {
        self.version.is_some()
            && self.created_at.is_some()
            && self.record_count.is_some()
            && self.checksum.is_some()
    }

    /// Names of the required keys that are missing
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.version.is_none() {
            missing.push("version");
        }
        if self.created_at.is_none() {
            missing.push("created_at");
        }
        if self.record_count.is_none() {
            missing.push("record_count");
        }
        if self.checksum.is_none() {
            missing.push("checksum");
        }
        missing
    }

    /// Vocabulary compatibility advisories.
    ///
    /// A major version outside the supported range means codes in the
    /// container may not resolve; minor and patch drift is accepted.
    pub fn vocab_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for (name, version) in &self.vocab_versions {
            match version.split('.').next().and_then(|m| m.parse::<u32>().ok()) {
                Some(major) if major == SUPPORTED_VOCAB_MAJOR => {}
                Some(_) => warnings.push(format!(
                    "Vocabulary {} version {} is incompatible (supported major: {})",
                    name, version, SUPPORTED_VOCAB_MAJOR
                )),
                None => warnings.push(format!(
                    "Invalid version format for vocabulary {}: {}",
                    name, version
                )),
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete_pairs() -> HashMap<String, String> {
        pairs(&[
            ("version", "1.0"),
            ("created_at", "2026-03-01T08:30:00Z"),
            ("record_count", "42"),
            ("checksum", "ab12cd34ef56ab78"),
        ])
    }

    #[test]
    fn complete_manifest_passes_the_gate() {
        let manifest = ImportManifest::from_key_values(&complete_pairs());
        assert!(manifest.is_complete());
        assert_eq!(manifest.record_count, Some(42));
        assert!(manifest.missing_keys().is_empty());
    }

    #[test]
    fn missing_checksum_fails_the_gate() {
        let mut entries = complete_pairs();
        entries.remove("checksum");
        let manifest = ImportManifest::from_key_values(&entries);
        assert!(!manifest.is_complete());
        assert_eq!(manifest.missing_keys(), vec!["checksum"]);
    }

    #[test]
    fn created_utc_is_an_accepted_spelling() {
        let mut entries = complete_pairs();
        entries.remove("created_at");
        entries.insert("created_utc".into(), "2026-03-01T08:30:00Z".into());
        let manifest = ImportManifest::from_key_values(&entries);
        assert!(manifest.is_complete());
    }

    #[test]
    fn empty_table_yields_empty_manifest() {
        let manifest = ImportManifest::from_key_values(&HashMap::new());
        assert!(manifest.is_empty());
        assert!(!manifest.is_complete());
    }

    #[test]
    fn vocab_major_mismatch_is_flagged() {
        let mut entries = complete_pairs();
        entries.insert(
            "vocab_versions".into(),
            r#"{"building_types":"2.0.0","document_types":"1.2.0"}"#.into(),
        );
        let manifest = ImportManifest::from_key_values(&entries);
        let warnings = manifest.vocab_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("building_types"));
    }
}
