//! Building persistence

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tenreg_common::db::models::Building;

use crate::error::Result;

/// Look up a building by its natural key
pub async fn find_by_building_id(pool: &SqlitePool, building_id: &str) -> Result<Option<Building>> {
    let row = sqlx::query(
        r#"
        SELECT building_id, governorate_code, district_code, subdistrict_code,
               community_code, neighborhood_code, building_type, building_status,
               floors_count, units_count, latitude, longitude
        FROM buildings
        WHERE building_id = ?
        "#,
    )
    .bind(building_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| Building {
        building_id: row.get("building_id"),
        governorate_code: row.get("governorate_code"),
        district_code: row.get("district_code"),
        subdistrict_code: row.get("subdistrict_code"),
        community_code: row.get("community_code"),
        neighborhood_code: row.get("neighborhood_code"),
        building_type: row.get("building_type"),
        building_status: row.get("building_status"),
        floors_count: row.get("floors_count"),
        units_count: row.get("units_count"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
    }))
}

/// Write a building row.
///
/// A collision on the natural key overwrites the existing row; this
/// is what admits a keep-new duplicate resolution.
pub async fn create(pool: &SqlitePool, building: &Building) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO buildings (
            building_id, governorate_code, district_code, subdistrict_code,
            community_code, neighborhood_code, building_type, building_status,
            floors_count, units_count, latitude, longitude, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(building_id) DO UPDATE SET
            governorate_code = excluded.governorate_code,
            district_code = excluded.district_code,
            subdistrict_code = excluded.subdistrict_code,
            community_code = excluded.community_code,
            neighborhood_code = excluded.neighborhood_code,
            building_type = excluded.building_type,
            building_status = excluded.building_status,
            floors_count = excluded.floors_count,
            units_count = excluded.units_count,
            latitude = excluded.latitude,
            longitude = excluded.longitude,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&building.building_id)
    .bind(&building.governorate_code)
    .bind(&building.district_code)
    .bind(&building.subdistrict_code)
    .bind(&building.community_code)
    .bind(&building.neighborhood_code)
    .bind(&building.building_type)
    .bind(&building.building_status)
    .bind(building.floors_count)
    .bind(building.units_count)
    .bind(building.latitude)
    .bind(building.longitude)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}
