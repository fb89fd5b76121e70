//! Person persistence

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tenreg_common::db::models::Person;

use crate::error::Result;

/// Look up a person by national ID
pub async fn find_by_national_id(pool: &SqlitePool, national_id: &str) -> Result<Option<Person>> {
    let row = sqlx::query(
        r#"
        SELECT person_id, national_id, first_name, first_name_ar, last_name,
               last_name_ar, father_name, mother_name, gender, year_of_birth,
               phone_number, mobile_number, email
        FROM persons
        WHERE national_id = ?
        "#,
    )
    .bind(national_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| Person {
        person_id: row.get("person_id"),
        national_id: row.get("national_id"),
        first_name: row.get("first_name"),
        first_name_ar: row.get("first_name_ar"),
        last_name: row.get("last_name"),
        last_name_ar: row.get("last_name_ar"),
        father_name: row.get("father_name"),
        mother_name: row.get("mother_name"),
        gender: row.get("gender"),
        year_of_birth: row.get("year_of_birth"),
        phone_number: row.get("phone_number"),
        mobile_number: row.get("mobile_number"),
        email: row.get("email"),
    }))
}

/// Write a person row.
///
/// A collision on the national ID overwrites the existing row
/// (keep-new resolution); a person_id collision still raises.
pub async fn create(pool: &SqlitePool, person: &Person) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO persons (
            person_id, national_id, first_name, first_name_ar, last_name,
            last_name_ar, father_name, mother_name, gender, year_of_birth,
            phone_number, mobile_number, email, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(national_id) DO UPDATE SET
            first_name = excluded.first_name,
            first_name_ar = excluded.first_name_ar,
            last_name = excluded.last_name,
            last_name_ar = excluded.last_name_ar,
            father_name = excluded.father_name,
            mother_name = excluded.mother_name,
            gender = excluded.gender,
            year_of_birth = excluded.year_of_birth,
            phone_number = excluded.phone_number,
            mobile_number = excluded.mobile_number,
            email = excluded.email,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&person.person_id)
    .bind(&person.national_id)
    .bind(&person.first_name)
    .bind(&person.first_name_ar)
    .bind(&person.last_name)
    .bind(&person.last_name_ar)
    .bind(&person.father_name)
    .bind(&person.mother_name)
    .bind(&person.gender)
    .bind(person.year_of_birth)
    .bind(&person.phone_number)
    .bind(&person.mobile_number)
    .bind(&person.email)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}
