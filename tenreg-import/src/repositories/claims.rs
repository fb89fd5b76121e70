//! Claim persistence
//!
//! Claim IDs are generated on commit from a per-year sequence:
//! `CL-<year>-NNNNNN`.

use chrono::{Datelike, Utc};
use sqlx::SqlitePool;
use tenreg_common::db::models::Claim;

use crate::error::Result;

/// Next claim identifier for the current year
pub async fn next_claim_id(pool: &SqlitePool) -> Result<String> {
    let year = Utc::now().year();

    let max_seq: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(CAST(SUBSTR(claim_id, 9) AS INTEGER)) FROM claims WHERE claim_id LIKE ?",
    )
    .bind(format!("CL-{}-%", year))
    .fetch_one(pool)
    .await?;

    Ok(format!("CL-{}-{:06}", year, max_seq.unwrap_or(0) + 1))
}

/// Insert a new claim row
pub async fn create(pool: &SqlitePool, claim: &Claim) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    let claimants = serde_json::to_string(&claim.claimant_ids)
        .unwrap_or_else(|_| "[]".to_string());

    sqlx::query(
        r#"
        INSERT INTO claims (
            claim_id, unit_id, claimant_ids, claim_type, status, source,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&claim.claim_id)
    .bind(&claim.unit_id)
    .bind(&claimants)
    .bind(&claim.claim_type)
    .bind(&claim.status)
    .bind(&claim.source)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}
