use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// The four account kinds. Each one sees its own dashboard tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Supervisor,
    Admin,
    Mayor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Supervisor => "supervisor",
            Role::Admin => "admin",
            Role::Mayor => "mayor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "supervisor" => Ok(Role::Supervisor),
            "admin" => Ok(Role::Admin),
            "mayor" => Ok(Role::Mayor),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Signed token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, supervisor id, or staff username depending on `role`.
    pub sub: String,
    pub role: Role,
    /// Random token id, used for logout revocation.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// HS256 signing and verification keys plus token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, role: Role, subject: &str) -> Result<IssuedToken, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            jti: new_token_id(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Token(format!("Failed to sign token: {e}")))?;
        Ok(IssuedToken { token, claims })
    }

    /// Check signature and expiry. Revocation is checked separately against the store.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("invalid token: {e}")))
    }
}

fn new_token_id() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-123456";

    #[test]
    fn issued_token_verifies_with_same_keys() {
        let keys = TokenKeys::new(SECRET, 3600);
        let issued = keys.issue(Role::Supervisor, "SUP-42").unwrap();
        let claims = keys.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "SUP-42");
        assert_eq!(claims.role, Role::Supervisor);
        assert_eq!(claims.jti.len(), 32);
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let keys = TokenKeys::new(SECRET, 3600);
        let other = TokenKeys::new("a-completely-different-secret-value!!", 3600);
        let issued = other.issue(Role::Admin, "admin").unwrap();
        assert!(matches!(keys.verify(&issued.token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = TokenKeys::new(SECRET, -3600);
        let issued = keys.issue(Role::User, "1").unwrap();
        assert!(keys.verify(&issued.token).is_err());
    }

    #[test]
    fn token_ids_differ() {
        let keys = TokenKeys::new(SECRET, 60);
        let a = keys.issue(Role::User, "1").unwrap();
        let b = keys.issue(Role::User, "1").unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
    }

    #[test]
    fn role_parses_from_lowercase_names() {
        assert_eq!("mayor".parse::<Role>().unwrap(), Role::Mayor);
        assert!("Mayor".parse::<Role>().is_err());
        assert_eq!(Role::Supervisor.to_string(), "supervisor");
    }
}
