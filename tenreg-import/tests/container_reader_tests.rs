//! Integration tests for the real container reader

mod helpers;

use helpers::{row, ContainerBuilder};
use tempfile::TempDir;
use tenreg_import::{ContainerReader, ImportError, RecordType, SourceReader};

#[tokio::test]
async fn missing_file_is_reported_as_such() {
    let dir = TempDir::new().expect("temp dir");
    let reader = ContainerReader::new();

    let err = reader
        .read_file(&dir.path().join("absent.trc"))
        .await
        .expect_err("must fail");

    assert!(matches!(err, ImportError::FileNotFound(_)));
}

#[tokio::test]
async fn wrong_extension_is_rejected_before_opening() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("export.zip");
    std::fs::write(&path, b"not a container").expect("write file");

    let reader = ContainerReader::new();
    let err = reader.read_file(&path).await.expect_err("must fail");

    assert!(matches!(err, ImportError::WrongExtension { .. }));
}

#[tokio::test]
async fn container_without_manifest_table_is_corrupt() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("export.trc");
    ContainerBuilder::new()
        .without_manifest_table()
        .table("buildings", &["building_id"], vec![row(&["01-01-01-001-001-00001"])])
        .write(&path)
        .await;

    let reader = ContainerReader::new();
    let err = reader.read_file(&path).await.expect_err("must fail");

    assert!(matches!(err, ImportError::CorruptContainer(_)));
}

#[tokio::test]
async fn empty_manifest_reads_but_fails_the_gate() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("export.trc");
    ContainerBuilder::new().empty_manifest().write(&path).await;

    let reader = ContainerReader::new();
    let data = reader.read_file(&path).await.expect("read");

    assert!(!reader.validate_manifest(&data.manifest));
}

#[tokio::test]
async fn entities_are_read_in_table_order_with_natural_key_ids() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("export.trc");
    ContainerBuilder::new()
        .manifest_entry("record_count", "3")
        .table(
            "buildings",
            &["building_id", "neighborhood_code"],
            vec![
                row(&["01-01-01-001-001-00001", "001"]),
                row(&["01-01-01-001-001-00002", "002"]),
            ],
        )
        .table(
            "persons",
            &["person_id", "first_name", "national_id"],
            vec![row(&["P-0001", "Amal", "12345678901"])],
        )
        .write(&path)
        .await;

    let reader = ContainerReader::new();
    let data = reader.read_file(&path).await.expect("read");
    assert!(reader.validate_manifest(&data.manifest));
    assert_eq!(data.manifest.record_count, Some(3));

    let records: Vec<_> = reader.extract_records(data).collect();
    assert_eq!(records.len(), 3);

    // Buildings come first, keyed by building_id
    assert_eq!(records[0].record_type, "building");
    assert_eq!(records[0].record_id, "01-01-01-001-001-00001");
    assert_eq!(records[1].record_id, "01-01-01-001-001-00002");

    // Missing units table means zero unit records, not an error
    assert!(records.iter().all(|r| r.record_type != "unit"));

    assert_eq!(records[2].record_type, "person");
    assert_eq!(records[2].record_id, "P-0001");
}

#[tokio::test]
async fn rows_without_any_id_get_synthesized_ones() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("export.trc");
    ContainerBuilder::new()
        .table(
            "persons",
            &["first_name", "last_name"],
            vec![row(&["Amal", "Shami"]), row(&["Omar", "Halabi"])],
        )
        .write(&path)
        .await;

    let reader = ContainerReader::new();
    let data = reader.read_file(&path).await.expect("read");
    let ids: Vec<String> = reader.extract_records(data).map(|r| r.record_id).collect();

    assert_eq!(ids, vec!["REC-0001", "REC-0002"]);
}

#[tokio::test]
async fn numeric_and_json_cells_decode_to_real_types() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("export.trc");
    ContainerBuilder::new()
        .table(
            "buildings",
            &["building_id", "neighborhood_code", "latitude", "floors_count"],
            vec![row(&["01-01-01-001-001-00001", "001", "36.2", "4"])],
        )
        .table(
            "claims",
            &["claim_id", "unit_id", "person_ids"],
            vec![row(&["C-1", "U-1", r#"["P-1","P-2"]"#])],
        )
        .write(&path)
        .await;

    let reader = ContainerReader::new();
    let data = reader.read_file(&path).await.expect("read");
    let records: Vec<_> = reader.extract_records(data).collect();

    let building = &records[0];
    // Numbers decode as numbers; zero-padded codes stay strings
    assert!(building.payload.get("latitude").expect("latitude").is_f64());
    assert!(building.payload.get("floors_count").expect("floors").is_i64());
    assert!(building.payload.get("neighborhood_code").expect("code").is_string());

    let claim = records
        .iter()
        .find(|r| r.record_type == RecordType::Claim.as_str())
        .expect("claim record");
    let claimants = claim.payload.get("person_ids").expect("person_ids");
    assert_eq!(claimants.as_array().map(|a| a.len()), Some(2));
}
