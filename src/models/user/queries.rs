use sqlx::PgPool;

use super::types::*;
use crate::errors::AppError;

const PROFILE_COLUMNS: &str = "id, name, email, phone, address, pincode, created_at";

/// Create a new citizen. Returns the new user's id.
pub async fn create(pool: &PgPool, new: &NewUser) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO users (name, email, phone, password, address, pincode) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.password)
    .bind(&new.address)
    .bind(&new.pincode)
    .fetch_one(pool)
    .await
}

/// Find a citizen by email (case-insensitive) for login.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, email, phone, password, address, pincode, created_at \
         FROM users WHERE LOWER(email) = LOWER($1)",
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await
}

pub async fn find_profile(pool: &PgPool, id: i64) -> Result<Option<UserProfile>, sqlx::Error> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, UserProfile>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Update profile fields; the password hash is only replaced when `password_hash` is Some.
pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    update: &ProfileUpdate,
    password_hash: Option<&str>,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE users SET name = $1, phone = $2, address = $3, pincode = $4, \
         password = COALESCE($5, password) \
         WHERE id = $6",
    )
    .bind(update.name.trim())
    .bind(update.phone.trim())
    .bind(update.address.trim())
    .bind(update.pincode.trim())
    .bind(password_hash)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
