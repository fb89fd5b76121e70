//! Property unit persistence

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tenreg_common::db::models::PropertyUnit;

use crate::error::Result;

/// Look up a unit by its composite natural key
pub async fn find_by_composite(
    pool: &SqlitePool,
    building_id: &str,
    unit_number: &str,
) -> Result<Option<PropertyUnit>> {
    let row = sqlx::query(
        r#"
        SELECT unit_id, building_id, unit_number, unit_type, floor_number,
               occupancy_status, property_description
        FROM property_units
        WHERE building_id = ? AND unit_number = ?
        "#,
    )
    .bind(building_id)
    .bind(unit_number)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| PropertyUnit {
        unit_id: row.get("unit_id"),
        building_id: row.get("building_id"),
        unit_number: row.get("unit_number"),
        unit_type: row.get("unit_type"),
        floor_number: row.get("floor_number"),
        occupancy_status: row.get("occupancy_status"),
        property_description: row.get("property_description"),
    }))
}

/// Write a unit row.
///
/// A collision on the composite natural key overwrites the existing
/// row (keep-new resolution); a unit_id collision still raises.
pub async fn create(pool: &SqlitePool, unit: &PropertyUnit) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO property_units (
            unit_id, building_id, unit_number, unit_type, floor_number,
            occupancy_status, property_description, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(building_id, unit_number) DO UPDATE SET
            unit_type = excluded.unit_type,
            floor_number = excluded.floor_number,
            occupancy_status = excluded.occupancy_status,
            property_description = excluded.property_description,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&unit.unit_id)
    .bind(&unit.building_id)
    .bind(&unit.unit_number)
    .bind(&unit.unit_type)
    .bind(unit.floor_number)
    .bind(&unit.occupancy_status)
    .bind(&unit.property_description)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}
