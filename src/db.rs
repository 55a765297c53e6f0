use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::password;
use crate::auth::token::Role;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{revoked_token, staff};

pub async fn init_pool(config: &AppConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Create or refresh the admin and mayor accounts from configuration.
/// Accounts without a configured password are left untouched.
pub async fn seed_staff(pool: &PgPool, config: &AppConfig) -> Result<(), AppError> {
    let accounts = [
        (&config.admin_username, &config.admin_password, Role::Admin),
        (&config.mayor_username, &config.mayor_password, Role::Mayor),
    ];

    for (username, password_opt, role) in accounts {
        let Some(plain) = password_opt else {
            log::warn!("No password configured for {} account '{}', skipping seed", role, username);
            continue;
        };
        let hash = password::hash_password(plain)?;
        staff::upsert(pool, username, &hash, role).await?;
        log::info!("Seeded {} account '{}'", role, username);
    }
    Ok(())
}

/// Drop revocation entries for tokens that have expired anyway.
pub async fn purge_expired_tokens(pool: &PgPool) {
    match revoked_token::purge_expired(pool).await {
        Ok(n) if n > 0 => log::info!("Purged {} expired revoked tokens", n),
        Ok(_) => {}
        Err(e) => log::error!("Revoked token cleanup failed: {}", e),
    }
}

/// Run `purge_expired_tokens` now and then every `every` for the life of the server.
pub fn spawn_token_cleanup(pool: PgPool, every: Duration) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            log::debug!("Running revoked token cleanup");
            purge_expired_tokens(&pool).await;
        }
    });
}
