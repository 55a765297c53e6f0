use std::env;

/// Minimum accepted length for the token signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60 * 24;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;

/// Runtime configuration, read from the environment (and `.env` when present).
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub media: MediaConfig,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub mayor_username: String,
    pub mayor_password: Option<String>,
}

/// Where complaint photos are uploaded.
#[derive(Clone, Debug, Default)]
pub struct MediaConfig {
    pub upload_url: String,
    pub upload_preset: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("db_max_connections", &self.db_max_connections)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("media", &self.media)
            .field("admin_username", &self.admin_username)
            .field("mayor_username", &self.mayor_username)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// `DATABASE_URL` and `JWT_SECRET` are required; everything else has a default.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(format!(
                "JWT_SECRET too short ({} bytes, need {}+)",
                jwt_secret.len(),
                MIN_JWT_SECRET_LEN
            ));
        }

        let token_ttl_secs = parse_or(env::var("TOKEN_TTL_SECS").ok(), DEFAULT_TOKEN_TTL_SECS);
        let db_max_connections =
            parse_or(env::var("DB_MAX_CONNECTIONS").ok(), DEFAULT_DB_MAX_CONNECTIONS);

        Ok(Self {
            database_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            db_max_connections,
            jwt_secret,
            token_ttl_secs,
            media: MediaConfig {
                upload_url: env::var("MEDIA_UPLOAD_URL").unwrap_or_default(),
                upload_preset: env::var("MEDIA_UPLOAD_PRESET").unwrap_or_default(),
            },
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
            mayor_username: env::var("MAYOR_USERNAME").unwrap_or_else(|_| "mayor".to_string()),
            mayor_password: env::var("MAYOR_PASSWORD").ok().filter(|p| !p.is_empty()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or::<i64>(Some("abc".into()), 7), 7);
        assert_eq!(parse_or::<i64>(None, 7), 7);
        assert_eq!(parse_or::<i64>(Some(" 42 ".into()), 7), 42);
    }
}
