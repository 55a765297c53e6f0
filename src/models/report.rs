use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::validate;
use crate::errors::{AppError, is_unique_violation};
use crate::models::complaint::parse_status;
use crate::models::status::ComplaintStatus;

/// Completion report filed by a supervisor.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Report {
    pub id: i64,
    pub complaint_id: i64,
    pub supervisor_id: Option<String>,
    pub days_invested: i32,
    pub worker_count: i32,
    pub labour_cost: f64,
    pub material_cost: f64,
    pub equipment_cost: f64,
    pub other_cost: f64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn total_cost(&self) -> f64 {
        self.labour_cost + self.material_cost + self.equipment_cost + self.other_cost
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CostBreakdown {
    pub labour: f64,
    pub material: f64,
    pub equipment: f64,
    pub other: f64,
    pub total: f64,
}

/// Report as returned to clients, with the cost lines grouped and totalled.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub id: i64,
    pub complaint_id: i64,
    pub supervisor_id: Option<String>,
    pub days_invested: i32,
    pub worker_count: i32,
    pub costs: CostBreakdown,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportView {
    fn from(r: Report) -> Self {
        let total = r.total_cost();
        ReportView {
            id: r.id,
            complaint_id: r.complaint_id,
            supervisor_id: r.supervisor_id,
            days_invested: r.days_invested,
            worker_count: r.worker_count,
            costs: CostBreakdown {
                labour: r.labour_cost,
                material: r.material_cost,
                equipment: r.equipment_cost,
                other: r.other_cost,
                total,
            },
            notes: r.notes,
            created_at: r.created_at,
        }
    }
}

/// Report listing entry for the mayor's view.
#[derive(Debug, Clone, Serialize)]
pub struct ReportListItem {
    pub complaint_title: String,
    pub pincode: String,
    #[serde(flatten)]
    pub report: ReportView,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub days_invested: i32,
    pub worker_count: i32,
    #[serde(default)]
    pub labour_cost: f64,
    #[serde(default)]
    pub material_cost: f64,
    #[serde(default)]
    pub equipment_cost: f64,
    #[serde(default)]
    pub other_cost: f64,
    #[serde(default)]
    pub notes: String,
}

impl ReportRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.days_invested < 0 {
            errors.push("Days invested must not be negative".to_string());
        }
        if self.worker_count < 1 {
            errors.push("Worker count must be at least 1".to_string());
        }
        errors.extend(validate::validate_non_negative(self.labour_cost, "Labour cost"));
        errors.extend(validate::validate_non_negative(self.material_cost, "Material cost"));
        errors.extend(validate::validate_non_negative(self.equipment_cost, "Equipment cost"));
        errors.extend(validate::validate_non_negative(self.other_cost, "Other cost"));
        errors.extend(validate::validate_optional(&self.notes, "Notes", 4000));
        errors
    }
}

const REPORT_COLUMNS: &str = "r.id, r.complaint_id, r.supervisor_id, r.days_invested, r.worker_count, \
     r.labour_cost, r.material_cost, r.equipment_cost, r.other_cost, r.notes, r.created_at";

/// File the completion report for a completed complaint assigned to `supervisor_id`.
pub async fn create(
    pool: &PgPool,
    complaint_id: i64,
    supervisor_id: &str,
    req: &ReportRequest,
) -> Result<i64, AppError> {
    #[derive(sqlx::FromRow)]
    struct Target {
        supervisor_id: Option<String>,
        status: Option<String>,
        has_report: bool,
    }

    let mut tx = pool.begin().await?;

    let target = sqlx::query_as::<_, Target>(
        "SELECT c.supervisor_id, \
                (SELECT m.status FROM status_messages m WHERE m.complaint_id = c.id \
                 ORDER BY m.id DESC LIMIT 1) AS status, \
                EXISTS (SELECT 1 FROM reports r WHERE r.complaint_id = c.id) AS has_report \
         FROM complaints c WHERE c.id = $1",
    )
    .bind(complaint_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound)?;

    if target.supervisor_id.as_deref() != Some(supervisor_id) {
        return Err(AppError::NotFound);
    }
    let status = target.status.as_deref().map(parse_status).transpose()?;
    if status != Some(ComplaintStatus::Completed) {
        return Err(AppError::BadRequest("Reports can only be filed for completed complaints".to_string()));
    }
    if target.has_report {
        return Err(AppError::BadRequest("A report was already filed for this complaint".to_string()));
    }

    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO reports (complaint_id, supervisor_id, days_invested, worker_count, \
                              labour_cost, material_cost, equipment_cost, other_cost, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(complaint_id)
    .bind(supervisor_id)
    .bind(req.days_invested)
    .bind(req.worker_count)
    .bind(req.labour_cost)
    .bind(req.material_cost)
    .bind(req.equipment_cost)
    .bind(req.other_cost)
    .bind(req.notes.trim())
    .fetch_one(&mut *tx)
    .await;

    let id = match inserted {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::BadRequest("A report was already filed for this complaint".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await?;
    Ok(id)
}

pub async fn find_for_complaint(pool: &PgPool, complaint_id: i64) -> Result<Option<ReportView>, sqlx::Error> {
    let sql = format!("SELECT {REPORT_COLUMNS} FROM reports r WHERE r.complaint_id = $1");
    let report = sqlx::query_as::<_, Report>(&sql)
        .bind(complaint_id)
        .fetch_optional(pool)
        .await?;
    Ok(report.map(ReportView::from))
}

/// Every filed report, newest first.
pub async fn find_all(pool: &PgPool) -> Result<Vec<ReportListItem>, sqlx::Error> {
    #[derive(sqlx::FromRow)]
    struct Row {
        complaint_title: String,
        pincode: String,
        #[sqlx(flatten)]
        report: Report,
    }

    let sql = format!(
        "SELECT c.title AS complaint_title, c.pincode, {REPORT_COLUMNS} \
         FROM reports r JOIN complaints c ON c.id = r.complaint_id \
         ORDER BY r.created_at DESC, r.id DESC"
    );
    let rows = sqlx::query_as::<_, Row>(&sql).fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| ReportListItem {
            complaint_title: row.complaint_title,
            pincode: row.pincode,
            report: ReportView::from(row.report),
        })
        .collect())
}
