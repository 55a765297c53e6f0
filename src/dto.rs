use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::token::{IssuedToken, Role};
use crate::models::complaint::{ComplaintPage, ComplaintSummary};

/// Generic paginated response wrapper for list endpoints.
#[derive(Serialize, Debug, Clone)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl From<ComplaintPage> for PaginatedResponse<ComplaintSummary> {
    fn from(p: ComplaintPage) -> Self {
        PaginatedResponse {
            items: p.items,
            page: p.page,
            per_page: p.per_page,
            total: p.total_count,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub role: Role,
    /// Email for citizens, supervisor id for supervisors, username for staff.
    pub identifier: String,
    pub password: String,
}

/// Returned by signup and login.
#[derive(Serialize, Debug)]
pub struct TokenResponse {
    pub token: String,
    pub role: Role,
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(t: IssuedToken) -> Self {
        let expires_at = t.claims.expires_at();
        TokenResponse {
            token: t.token,
            role: t.claims.role,
            subject: t.claims.sub,
            expires_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct MeResponse {
    pub role: Role,
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}
