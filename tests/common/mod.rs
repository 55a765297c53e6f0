//! Shared fixtures for the database-backed tests.
//!
//! Every test gets a fresh, migrated database from `#[sqlx::test]`; these helpers
//! only insert rows through the same model functions the handlers use.

#![allow(dead_code)]

use sqlx::PgPool;

use roadfix::auth::password;
use roadfix::models::complaint::{self, NewComplaint, ProgressUpdate, Severity};
use roadfix::models::status::ComplaintStatus;
use roadfix::models::supervisor::{self, NewSupervisor};
use roadfix::models::user::{self, NewUser};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const PASSWORD: &str = "correct-horse-battery";
pub const PINCODE: &str = "560001";
pub const OTHER_PINCODE: &str = "560002";
pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

// ============================================================================
// FIXTURES
// ============================================================================

pub async fn create_user(pool: &PgPool, email: &str) -> i64 {
    let new = NewUser {
        name: "Test Citizen".to_string(),
        email: email.to_string(),
        phone: "9876543210".to_string(),
        password: password::hash_password(PASSWORD).expect("hash"),
        address: "12 MG Road".to_string(),
        pincode: PINCODE.to_string(),
    };
    user::create(pool, &new).await.expect("create user")
}

pub async fn create_supervisor(pool: &PgPool, id: &str, pincode: &str) {
    let new = NewSupervisor {
        id: id.to_string(),
        name: format!("Supervisor {id}"),
        email: format!("{}@city.gov", id.to_lowercase()),
        phone: "9000000000".to_string(),
        password: password::hash_password(PASSWORD).expect("hash"),
        pincode: pincode.to_string(),
    };
    supervisor::create(pool, &new).await.expect("create supervisor");
}

pub async fn create_complaint(pool: &PgPool, user_id: i64, pincode: &str) -> i64 {
    let new = NewComplaint {
        user_id,
        title: "Pothole near bus stop".to_string(),
        description: "Deep pothole, two-wheelers swerving".to_string(),
        location: "MG Road".to_string(),
        pincode: pincode.to_string(),
        severity: Severity::High,
        image_urls: vec!["https://media.example/pothole.jpg".to_string()],
    };
    complaint::create(pool, &new).await.expect("create complaint")
}

pub fn progress(status: ComplaintStatus) -> ProgressUpdate {
    ProgressUpdate {
        status,
        message: format!("Now {status}"),
        estimated_expense: None,
        estimated_end_date: None,
        image_urls: Vec::new(),
    }
}

/// Assign `supervisor_id` and walk the complaint through `steps`.
pub async fn advance(pool: &PgPool, complaint_id: i64, supervisor_id: &str, steps: &[ComplaintStatus]) {
    complaint::assign_supervisor(pool, complaint_id, supervisor_id, "Assigned")
        .await
        .expect("assign");
    for &step in steps {
        complaint::update_progress(pool, complaint_id, supervisor_id, &progress(step))
            .await
            .expect("progress");
    }
}

/// A complaint filed by `user_id` and completed by `supervisor_id`.
pub async fn completed_complaint(pool: &PgPool, user_id: i64, supervisor_id: &str) -> i64 {
    let id = create_complaint(pool, user_id, PINCODE).await;
    advance(pool, id, supervisor_id, &[ComplaintStatus::Completed]).await;
    id
}
