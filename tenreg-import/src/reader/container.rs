//! Real container reader
//!
//! A container is a single SQLite file produced by a field-collection
//! device: a `_manifest` key/value table plus one optional table per
//! entity kind. Tables the device had no data for are simply absent.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Column, Row};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::{ImportError, Result};
use crate::models::manifest::ImportManifest;
use crate::models::payload::Payload;
use crate::models::record::RecordType;
use crate::reader::{ContainerData, RawRecord, SourceReader};

/// Expected container file suffix
pub const CONTAINER_EXTENSION: &str = "trc";

/// Reads `.trc` container files
#[derive(Debug, Default)]
pub struct ContainerReader;

impl ContainerReader {
    pub fn new() -> Self {
        Self
    }

    /// Keys tried, in order, for a row's natural-key record id
    fn id_keys(record_type: RecordType) -> &'static [&'static str] {
        match record_type {
            RecordType::Building => &["id", "building_id"],
            RecordType::Unit => &["id", "unit_id"],
            RecordType::Person => &["id", "person_id", "national_id"],
            RecordType::Claim => &["id", "claim_id", "case_number"],
        }
    }

    async fn open(&self, path: &Path) -> Result<SqlitePool> {
        let db_url = format!("sqlite://{}?mode=ro", path.display());
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await
            .map_err(|e| ImportError::CorruptContainer(format!("{}: {}", path.display(), e)))
    }

    async fn read_manifest(&self, pool: &SqlitePool, path: &Path) -> Result<ImportManifest> {
        if !table_exists(pool, "_manifest")
            .await
            .map_err(|e| ImportError::CorruptContainer(format!("{}: {}", path.display(), e)))?
        {
            return Err(ImportError::CorruptContainer(format!(
                "{}: missing _manifest table",
                path.display()
            )));
        }

        let rows = sqlx::query("SELECT key, value FROM _manifest")
            .fetch_all(pool)
            .await
            .map_err(|e| ImportError::CorruptContainer(format!("{}: {}", path.display(), e)))?;

        let mut pairs = HashMap::new();
        for row in rows {
            let key: String = row.get("key");
            if let Ok(Some(value)) = row.try_get::<Option<String>, _>("value") {
                pairs.insert(key, value);
            }
        }

        Ok(ImportManifest::from_key_values(&pairs))
    }

    async fn read_entity_table(
        &self,
        pool: &SqlitePool,
        record_type: RecordType,
        out: &mut Vec<RawRecord>,
    ) -> Result<()> {
        let table = record_type.table_name();
        if !table_exists(pool, table).await? {
            debug!("Container has no {} table", table);
            return Ok(());
        }

        let query = format!("SELECT * FROM \"{}\"", table);
        let rows = sqlx::query(&query).fetch_all(pool).await?;

        for row in rows {
            let mut payload = Payload::new();
            for (i, column) in row.columns().iter().enumerate() {
                payload.insert(column.name().to_string(), cell_value(&row, i));
            }

            let source_id =
                crate::models::payload::get_string(&payload, Self::id_keys(record_type));

            out.push(RawRecord {
                record_type,
                source_id,
                payload,
            });
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl SourceReader for ContainerReader {
    async fn read_file(&self, path: &Path) -> Result<ContainerData> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.to_path_buf()));
        }

        let extension_ok = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(CONTAINER_EXTENSION))
            .unwrap_or(false);
        if !extension_ok {
            return Err(ImportError::WrongExtension {
                path: path.to_path_buf(),
                expected: CONTAINER_EXTENSION,
            });
        }

        let pool = self.open(path).await?;

        let result = async {
            let manifest = self.read_manifest(&pool, path).await?;

            let mut records = Vec::new();
            for record_type in RecordType::ALL {
                self.read_entity_table(&pool, record_type, &mut records)
                    .await?;
            }

            debug!(
                records = records.len(),
                "Read container {}",
                path.display()
            );

            Ok(ContainerData { manifest, records })
        }
        .await;

        pool.close().await;
        result
    }

    fn validate_manifest(&self, manifest: &ImportManifest) -> bool {
        // An entirely empty key/value table means the manifest table
        // existed but carried nothing usable
        !manifest.is_empty() && manifest.is_complete()
    }
}

async fn table_exists(pool: &SqlitePool, table: &str) -> std::result::Result<bool, sqlx::Error> {
    let found: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Decode one cell into a payload value.
///
/// Cells are stored as text; numeric storage classes coerce through
/// SQLite's text conversion. Text that parses as non-string JSON
/// (numbers, arrays, objects from the exporting device) is kept in its
/// decoded form so downstream field access sees real types.
fn cell_value(row: &sqlx::sqlite::SqliteRow, index: usize) -> serde_json::Value {
    match row.try_get::<Option<String>, _>(index) {
        Ok(Some(text)) => match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(decoded) if !decoded.is_string() => decoded,
            _ => serde_json::Value::String(text),
        },
        _ => serde_json::Value::Null,
    }
}
