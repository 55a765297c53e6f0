use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Internal citizen record for authentication, including the password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub address: String,
    pub pincode: String,
    pub created_at: DateTime<Utc>,
}

/// Safe version for responses, without the password hash.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub pincode: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        UserProfile {
            id: u.id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            address: u.address,
            pincode: u.pincode,
            created_at: u.created_at,
        }
    }
}

/// New citizen data for creation; `password` is already hashed.
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub address: String,
    pub pincode: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
    #[serde(default)]
    pub address: String,
    pub pincode: String,
}

/// Profile edit. Email is the login identifier and cannot be changed here.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub pincode: String,
    /// New password, if the citizen wants to change it.
    #[serde(default)]
    pub password: Option<String>,
}
