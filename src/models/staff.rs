use sqlx::PgPool;

use crate::auth::token::Role;

/// Admin or mayor account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Staff {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// Insert the account, or replace its password and role if it already exists.
pub async fn upsert(pool: &PgPool, username: &str, password_hash: &str, role: Role) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO staff (username, password, role) VALUES ($1, $2, $3) \
         ON CONFLICT (username) DO UPDATE SET password = EXCLUDED.password, role = EXCLUDED.role",
    )
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

/// Find a staff account holding `role`.
pub async fn find(pool: &PgPool, username: &str, role: Role) -> Result<Option<Staff>, sqlx::Error> {
    sqlx::query_as::<_, Staff>(
        "SELECT username, password, role FROM staff WHERE username = $1 AND role = $2",
    )
    .bind(username.trim())
    .bind(role.as_str())
    .fetch_optional(pool)
    .await
}
