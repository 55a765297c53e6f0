use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Internal supervisor record for authentication, including the password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Supervisor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub pincode: String,
    pub created_at: DateTime<Utc>,
}

/// Safe version for responses, without the password hash.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SupervisorProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pincode: String,
    pub created_at: DateTime<Utc>,
}

/// A supervisor annotated with current workload and rating.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorWorkload {
    #[serde(flatten)]
    pub supervisor: SupervisorProfile,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub average_rating: Option<f64>,
}

/// New supervisor data; `password` is already hashed.
pub struct NewSupervisor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub pincode: String,
}

#[derive(Debug, Deserialize)]
pub struct SupervisorRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
    pub pincode: String,
}
