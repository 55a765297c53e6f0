use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::errors::{AppError, is_unique_violation};
use crate::models::complaint::parse_status;
use crate::models::status::ComplaintStatus;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: i64,
    pub complaint_id: i64,
    pub user_id: i64,
    pub supervisor_id: Option<String>,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Feedback listed for a supervisor, with the complaint it concerns.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FeedbackItem {
    pub id: i64,
    pub complaint_id: i64,
    pub complaint_title: String,
    pub user_name: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
}

/// Leave feedback on a completed complaint owned by `user_id`. One per complaint.
pub async fn create(
    pool: &PgPool,
    complaint_id: i64,
    user_id: i64,
    rating: i16,
    comment: &str,
) -> Result<i64, AppError> {
    #[derive(sqlx::FromRow)]
    struct Target {
        user_id: i64,
        supervisor_id: Option<String>,
        status: Option<String>,
        has_feedback: bool,
    }

    let mut tx = pool.begin().await?;

    let target = sqlx::query_as::<_, Target>(
        "SELECT c.user_id, c.supervisor_id, \
                (SELECT m.status FROM status_messages m WHERE m.complaint_id = c.id \
                 ORDER BY m.id DESC LIMIT 1) AS status, \
                EXISTS (SELECT 1 FROM feedback f WHERE f.complaint_id = c.id) AS has_feedback \
         FROM complaints c WHERE c.id = $1",
    )
    .bind(complaint_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound)?;

    // Citizens only see their own complaints.
    if target.user_id != user_id {
        return Err(AppError::NotFound);
    }
    let status = target.status.as_deref().map(parse_status).transpose()?;
    if status != Some(ComplaintStatus::Completed) {
        return Err(AppError::BadRequest(
            "Feedback can only be given on completed complaints".to_string(),
        ));
    }
    if target.has_feedback {
        return Err(AppError::BadRequest("Feedback was already submitted for this complaint".to_string()));
    }

    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO feedback (complaint_id, user_id, supervisor_id, rating, comment) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(complaint_id)
    .bind(user_id)
    .bind(&target.supervisor_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(&mut *tx)
    .await;

    let id = match inserted {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::BadRequest("Feedback was already submitted for this complaint".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await?;
    Ok(id)
}

pub async fn find_for_complaint(pool: &PgPool, complaint_id: i64) -> Result<Option<Feedback>, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(
        "SELECT id, complaint_id, user_id, supervisor_id, rating, comment, created_at \
         FROM feedback WHERE complaint_id = $1",
    )
    .bind(complaint_id)
    .fetch_optional(pool)
    .await
}

/// Feedback attributed to a supervisor, newest first.
pub async fn find_for_supervisor(pool: &PgPool, supervisor_id: &str) -> Result<Vec<FeedbackItem>, sqlx::Error> {
    sqlx::query_as::<_, FeedbackItem>(
        "SELECT f.id, f.complaint_id, c.title AS complaint_title, u.name AS user_name, \
                f.rating, f.comment, f.created_at \
         FROM feedback f \
         JOIN complaints c ON c.id = f.complaint_id \
         JOIN users u ON u.id = f.user_id \
         WHERE f.supervisor_id = $1 \
         ORDER BY f.created_at DESC, f.id DESC",
    )
    .bind(supervisor_id)
    .fetch_all(pool)
    .await
}
