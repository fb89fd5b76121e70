//! Database initialization
//!
//! Opens (or creates) the registry database and applies the schema
//! idempotently so every service can start against an empty data folder.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows a reader (duplicate lookups) alongside the commit writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Apply the registry schema (idempotent - safe to call multiple times)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_buildings_table(pool).await?;
    create_property_units_table(pool).await?;
    create_persons_table(pool).await?;
    create_claims_table(pool).await?;
    create_import_history_table(pool).await?;

    info!("Database schema initialized");

    Ok(())
}

pub async fn create_buildings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS buildings (
            building_id TEXT PRIMARY KEY,
            governorate_code TEXT,
            district_code TEXT,
            subdistrict_code TEXT,
            community_code TEXT,
            neighborhood_code TEXT,
            building_type TEXT,
            building_status TEXT,
            floors_count INTEGER,
            units_count INTEGER,
            latitude REAL,
            longitude REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_property_units_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS property_units (
            unit_id TEXT PRIMARY KEY,
            building_id TEXT NOT NULL,
            unit_number TEXT,
            unit_type TEXT,
            floor_number INTEGER,
            occupancy_status TEXT,
            property_description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Composite natural key used by duplicate detection
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_units_building_number
        ON property_units (building_id, unit_number)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_persons_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            person_id TEXT PRIMARY KEY,
            national_id TEXT UNIQUE,
            first_name TEXT,
            first_name_ar TEXT,
            last_name TEXT,
            last_name_ar TEXT,
            father_name TEXT,
            mother_name TEXT,
            gender TEXT,
            year_of_birth INTEGER,
            phone_number TEXT,
            mobile_number TEXT,
            email TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_claims_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS claims (
            claim_id TEXT PRIMARY KEY,
            unit_id TEXT NOT NULL,
            claimant_ids TEXT NOT NULL DEFAULT '[]',
            claim_type TEXT,
            status TEXT,
            source TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_import_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS import_history (
            import_id TEXT PRIMARY KEY,
            file_name TEXT NOT NULL,
            file_path TEXT NOT NULL,
            file_hash TEXT NOT NULL DEFAULT '',
            import_date TEXT NOT NULL,
            imported_by TEXT NOT NULL,
            status TEXT NOT NULL,
            total_records INTEGER NOT NULL DEFAULT 0,
            imported_records INTEGER NOT NULL DEFAULT 0,
            failed_records INTEGER NOT NULL DEFAULT 0,
            skipped_records INTEGER NOT NULL DEFAULT 0,
            warnings_count INTEGER NOT NULL DEFAULT 0,
            errors TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
