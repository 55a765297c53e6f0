use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::feedback::Feedback;
use crate::models::report::ReportView;
use crate::models::status::ComplaintStatus;
use crate::models::timeline::TimelineStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Severity::Low),
            "Medium" => Ok(Severity::Medium),
            "High" => Ok(Severity::High),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Raw complaint row joined with owner, supervisor and latest status message.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ComplaintRow {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub pincode: String,
    pub severity: String,
    pub image_urls: Vec<String>,
    pub supervisor_id: Option<String>,
    pub supervisor_name: Option<String>,
    pub supervisor_phone: Option<String>,
    pub estimated_expense: Option<f64>,
    pub estimated_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Complaint as shown in list views.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintSummary {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub title: String,
    pub location: String,
    pub pincode: String,
    pub severity: Severity,
    pub status: Option<ComplaintStatus>,
    pub supervisor_id: Option<String>,
    pub supervisor_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupervisorContact {
    pub id: String,
    pub name: String,
    pub phone: String,
}

/// One entry of the append-only status log.
#[derive(Debug, Clone, Serialize)]
pub struct StatusMessage {
    pub id: i64,
    pub status: ComplaintStatus,
    pub message: String,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fully hydrated complaint for detail pages.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintDetail {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub pincode: String,
    pub severity: Severity,
    pub image_urls: Vec<String>,
    pub status: Option<ComplaintStatus>,
    pub supervisor: Option<SupervisorContact>,
    pub estimated_expense: Option<f64>,
    pub estimated_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<StatusMessage>,
    pub timeline: Vec<TimelineStep>,
    pub feedback: Option<Feedback>,
    pub report: Option<ReportView>,
}

/// Paginated complaint list.
pub struct ComplaintPage {
    pub items: Vec<ComplaintSummary>,
    pub page: i64,
    pub per_page: i64,
    pub total_count: i64,
}

/// List filters; `None` means "any".
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub status: Option<ComplaintStatus>,
    pub pincode: Option<String>,
    pub user_id: Option<i64>,
    pub supervisor_id: Option<String>,
}

/// New complaint data; images are already uploaded.
pub struct NewComplaint {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub pincode: String,
    pub severity: Severity,
    pub image_urls: Vec<String>,
}

/// Supervisor progress update; images are already uploaded.
pub struct ProgressUpdate {
    pub status: ComplaintStatus,
    pub message: String,
    pub estimated_expense: Option<f64>,
    pub estimated_end_date: Option<NaiveDate>,
    pub image_urls: Vec<String>,
}

/// Who is rejecting a complaint.
#[derive(Debug, Clone, Copy)]
pub enum Rejector<'a> {
    Admin,
    Supervisor(&'a str),
}

#[derive(Debug, Deserialize)]
pub struct ComplaintRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub pincode: String,
    pub severity: Severity,
    /// Base64 payloads or data URIs.
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ComplaintStatus,
    #[serde(default)]
    pub message: String,
    pub estimated_expense: Option<f64>,
    pub estimated_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub supervisor_id: String,
    #[serde(default)]
    pub message: Option<String>,
}
