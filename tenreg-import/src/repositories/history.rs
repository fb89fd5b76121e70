//! Import audit history
//!
//! Append-only: rows are written exactly once per commit run and never
//! updated or deleted by this pipeline.

use sqlx::{Row, SqlitePool};
use tenreg_common::db::models::ImportHistoryEntry;

use crate::error::Result;

/// Append one history row
pub async fn append(pool: &SqlitePool, entry: &ImportHistoryEntry) -> Result<()> {
    let errors = serde_json::to_string(&entry.errors).unwrap_or_else(|_| "[]".to_string());

    sqlx::query(
        r#"
        INSERT INTO import_history (
            import_id, file_name, file_path, file_hash, import_date,
            imported_by, status, total_records, imported_records,
            failed_records, skipped_records, warnings_count, errors
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.import_id)
    .bind(&entry.file_name)
    .bind(&entry.file_path)
    .bind(&entry.file_hash)
    .bind(&entry.import_date)
    .bind(&entry.imported_by)
    .bind(&entry.status)
    .bind(entry.total_records)
    .bind(entry.imported_records)
    .bind(entry.failed_records)
    .bind(entry.skipped_records)
    .bind(entry.warnings_count)
    .bind(&errors)
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent runs, newest first
pub async fn list_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<ImportHistoryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT import_id, file_name, file_path, file_hash, import_date,
               imported_by, status, total_records, imported_records,
               failed_records, skipped_records, warnings_count, errors
        FROM import_history
        ORDER BY import_date DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let errors_raw: String = row.get("errors");
        entries.push(ImportHistoryEntry {
            import_id: row.get("import_id"),
            file_name: row.get("file_name"),
            file_path: row.get("file_path"),
            file_hash: row.get("file_hash"),
            import_date: row.get("import_date"),
            imported_by: row.get("imported_by"),
            status: row.get("status"),
            total_records: row.get("total_records"),
            imported_records: row.get("imported_records"),
            failed_records: row.get("failed_records"),
            skipped_records: row.get("skipped_records"),
            warnings_count: row.get("warnings_count"),
            errors: serde_json::from_str(&errors_raw).unwrap_or_default(),
        });
    }

    Ok(entries)
}
