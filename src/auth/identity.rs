use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use chrono::{DateTime, TimeZone, Utc};

use super::token::{Claims, Role};
use crate::errors::AppError;

/// The authenticated caller, attached to the request by `middleware::require_bearer`.
///
/// Handlers take this as an extractor instead of reading the token themselves.
#[derive(Debug, Clone)]
pub struct Identity {
    pub role: Role,
    pub subject: String,
    pub jti: String,
    pub exp: i64,
}

impl From<Claims> for Identity {
    fn from(c: Claims) -> Self {
        Identity { role: c.role, subject: c.sub, jti: c.jti, exp: c.exp }
    }
}

impl Identity {
    /// Check the caller's role; returns Err(AppError::Forbidden) if it is not one of `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("role {} not in {:?}", self.role, allowed)))
        }
    }

    /// Citizen id of a `user` identity.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.require(&[Role::User])?;
        self.subject
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("malformed user subject".to_string()))
    }

    /// Supervisor id of a `supervisor` identity.
    pub fn supervisor_id(&self) -> Result<&str, AppError> {
        self.require(&[Role::Supervisor])?;
        Ok(&self.subject)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Identity>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("no identity on request".to_string())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role, subject: &str) -> Identity {
        Identity { role, subject: subject.to_string(), jti: "j".into(), exp: 0 }
    }

    #[test]
    fn require_accepts_listed_role_only() {
        let admin = identity(Role::Admin, "admin");
        assert!(admin.require(&[Role::Admin, Role::Mayor]).is_ok());
        assert!(matches!(admin.require(&[Role::User]), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn user_id_parses_numeric_subject() {
        assert_eq!(identity(Role::User, "17").user_id().unwrap(), 17);
        assert!(identity(Role::User, "abc").user_id().is_err());
        assert!(identity(Role::Supervisor, "17").user_id().is_err());
    }
}
