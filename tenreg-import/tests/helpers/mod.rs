//! Test helpers: author real container files on disk
#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;

/// Builds a `.trc` container file for tests
pub struct ContainerBuilder {
    manifest: Vec<(String, String)>,
    include_manifest_table: bool,
    tables: Vec<(String, Vec<String>, Vec<Vec<String>>)>,
}

impl ContainerBuilder {
    /// A builder whose manifest passes the completeness gate
    pub fn new() -> Self {
        Self {
            manifest: vec![
                ("version".into(), "1.0".into()),
                ("created_at".into(), "2026-03-01T08:30:00Z".into()),
                ("record_count".into(), "0".into()),
                ("checksum".into(), "ab12cd34ef56ab78".into()),
                (
                    "vocab_versions".into(),
                    r#"{"building_types":"1.0.0","document_types":"1.2.0"}"#.into(),
                ),
            ],
            include_manifest_table: true,
            tables: Vec::new(),
        }
    }

    pub fn manifest_entry(mut self, key: &str, value: &str) -> Self {
        self.manifest.retain(|(k, _)| k != key);
        self.manifest.push((key.to_string(), value.to_string()));
        self
    }

    pub fn without_manifest_key(mut self, key: &str) -> Self {
        self.manifest.retain(|(k, _)| k != key);
        self
    }

    /// Manifest table present but carrying nothing
    pub fn empty_manifest(mut self) -> Self {
        self.manifest.clear();
        self
    }

    /// No manifest table at all (a corrupt container)
    pub fn without_manifest_table(mut self) -> Self {
        self.include_manifest_table = false;
        self
    }

    pub fn table(mut self, name: &str, columns: &[&str], rows: Vec<Vec<String>>) -> Self {
        self.tables.push((
            name.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        ));
        self
    }

    pub async fn write(self, path: &Path) {
        let db_url = format!("sqlite://{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await
            .expect("create container file");

        if self.include_manifest_table {
            sqlx::query("CREATE TABLE _manifest (key TEXT PRIMARY KEY, value TEXT)")
                .execute(&pool)
                .await
                .expect("create _manifest");

            for (key, value) in &self.manifest {
                sqlx::query("INSERT INTO _manifest (key, value) VALUES (?, ?)")
                    .bind(key)
                    .bind(value)
                    .execute(&pool)
                    .await
                    .expect("insert manifest entry");
            }
        }

        for (name, columns, rows) in &self.tables {
            let column_defs: Vec<String> =
                columns.iter().map(|c| format!("\"{}\" TEXT", c)).collect();
            let create = format!("CREATE TABLE \"{}\" ({})", name, column_defs.join(", "));
            sqlx::query(&create).execute(&pool).await.expect("create table");

            let placeholders = vec!["?"; columns.len()].join(", ");
            let insert = format!("INSERT INTO \"{}\" VALUES ({})", name, placeholders);

            for row in rows {
                assert_eq!(row.len(), columns.len(), "row width mismatch in {}", name);
                let mut query = sqlx::query(&insert);
                for cell in row {
                    query = query.bind(cell);
                }
                query.execute(&pool).await.expect("insert row");
            }
        }

        pool.close().await;
    }
}

/// Owned row cells from string literals
pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}
