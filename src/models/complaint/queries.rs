use sqlx::{PgConnection, PgPool};

use super::types::*;
use crate::errors::AppError;
use crate::models::status::ComplaintStatus;
use crate::models::timeline::{self, StatusEntry};
use crate::models::{feedback, report};

const SELECT_COMPLAINT: &str = "SELECT c.id, c.user_id, u.name AS user_name, c.title, c.description, \
            c.location, c.pincode, c.severity, c.image_urls, c.supervisor_id, \
            s.name AS supervisor_name, s.phone AS supervisor_phone, \
            c.estimated_expense, c.estimated_end_date, c.created_at, \
            last.status AS status, last.created_at AS updated_at \
     FROM complaints c \
     JOIN users u ON u.id = c.user_id \
     LEFT JOIN supervisors s ON s.id = c.supervisor_id \
     LEFT JOIN LATERAL ( \
         SELECT m.status, m.created_at FROM status_messages m \
         WHERE m.complaint_id = c.id ORDER BY m.id DESC LIMIT 1 \
     ) last ON TRUE";

/// Shared WHERE clause for list queries; every filter is optional.
const FILTER_CLAUSE: &str = "WHERE ($1::TEXT IS NULL OR last.status = $1) \
       AND ($2::TEXT IS NULL OR c.pincode = $2) \
       AND ($3::BIGINT IS NULL OR c.user_id = $3) \
       AND ($4::TEXT IS NULL OR c.supervisor_id = $4)";

pub(crate) fn parse_status(raw: &str) -> Result<ComplaintStatus, AppError> {
    raw.parse()
        .map_err(|e: String| AppError::Db(sqlx::Error::Decode(e.into())))
}

fn parse_severity(raw: &str) -> Result<Severity, AppError> {
    raw.parse()
        .map_err(|e: String| AppError::Db(sqlx::Error::Decode(e.into())))
}

fn to_summary(row: ComplaintRow) -> Result<ComplaintSummary, AppError> {
    Ok(ComplaintSummary {
        id: row.id,
        user_id: row.user_id,
        user_name: row.user_name,
        title: row.title,
        location: row.location,
        pincode: row.pincode,
        severity: parse_severity(&row.severity)?,
        status: row.status.as_deref().map(parse_status).transpose()?,
        supervisor_id: row.supervisor_id,
        supervisor_name: row.supervisor_name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Create a complaint together with its initial `Submitted` log entry.
pub async fn create(pool: &PgPool, new: &NewComplaint) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO complaints (user_id, title, description, location, pincode, severity, image_urls) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
    )
    .bind(new.user_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.location)
    .bind(&new.pincode)
    .bind(new.severity.as_str())
    .bind(&new.image_urls)
    .fetch_one(&mut *tx)
    .await?;

    append_status(&mut tx, id, ComplaintStatus::Submitted, "Complaint submitted", &[]).await?;

    tx.commit().await?;
    Ok(id)
}

/// Append one entry to a complaint's status log.
async fn append_status(
    conn: &mut PgConnection,
    complaint_id: i64,
    status: ComplaintStatus,
    message: &str,
    image_urls: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO status_messages (complaint_id, status, message, image_urls) VALUES ($1, $2, $3, $4)",
    )
    .bind(complaint_id)
    .bind(status.as_str())
    .bind(message)
    .bind(image_urls)
    .execute(conn)
    .await?;
    Ok(())
}

/// Current status read inside a transaction. Unknown complaints are NotFound.
async fn current_state(conn: &mut PgConnection, complaint_id: i64) -> Result<(Option<String>, ComplaintStatus), AppError> {
    let supervisor_id: Option<Option<String>> =
        sqlx::query_scalar("SELECT supervisor_id FROM complaints WHERE id = $1")
            .bind(complaint_id)
            .fetch_optional(&mut *conn)
            .await?;
    let supervisor_id = supervisor_id.ok_or(AppError::NotFound)?;

    let status: Option<String> = sqlx::query_scalar(
        "SELECT status FROM status_messages WHERE complaint_id = $1 ORDER BY id DESC LIMIT 1",
    )
    .bind(complaint_id)
    .fetch_optional(&mut *conn)
    .await?;
    let status = status
        .ok_or_else(|| AppError::BadRequest("Complaint has no status history".to_string()))?;

    Ok((supervisor_id, parse_status(&status)?))
}

pub async fn find_row(pool: &PgPool, id: i64) -> Result<Option<ComplaintRow>, AppError> {
    let sql = format!("{SELECT_COMPLAINT} WHERE c.id = $1");
    let row = sqlx::query_as::<_, ComplaintRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// The status log of a complaint in append order.
pub async fn find_messages(pool: &PgPool, complaint_id: i64) -> Result<Vec<StatusMessage>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        status: String,
        message: String,
        image_urls: Vec<String>,
        created_at: chrono::DateTime<chrono::Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, status, message, image_urls, created_at \
         FROM status_messages WHERE complaint_id = $1 ORDER BY id",
    )
    .bind(complaint_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            Ok(StatusMessage {
                id: r.id,
                status: parse_status(&r.status)?,
                message: r.message,
                image_urls: r.image_urls,
                created_at: r.created_at,
            })
        })
        .collect()
}

/// Load a complaint with its log, timeline, supervisor, feedback and report.
pub async fn find_detail(pool: &PgPool, id: i64) -> Result<Option<ComplaintDetail>, AppError> {
    let Some(row) = find_row(pool, id).await? else {
        return Ok(None);
    };

    let messages = find_messages(pool, id).await?;
    let entries: Vec<StatusEntry> = messages
        .iter()
        .map(|m| StatusEntry { status: m.status, created_at: m.created_at })
        .collect();
    let timeline = timeline::derive_timeline(&entries, row.estimated_end_date);
    let status = timeline::current_status(&entries);

    let feedback = feedback::find_for_complaint(pool, id).await?;
    let report = report::find_for_complaint(pool, id).await?;

    let supervisor = match (row.supervisor_id, row.supervisor_name) {
        (Some(id), Some(name)) => Some(SupervisorContact {
            id,
            name,
            phone: row.supervisor_phone.unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(Some(ComplaintDetail {
        id: row.id,
        user_id: row.user_id,
        user_name: row.user_name,
        title: row.title,
        description: row.description,
        location: row.location,
        pincode: row.pincode,
        severity: parse_severity(&row.severity)?,
        image_urls: row.image_urls,
        status,
        supervisor,
        estimated_expense: row.estimated_expense,
        estimated_end_date: row.estimated_end_date,
        created_at: row.created_at,
        messages,
        timeline,
        feedback,
        report,
    }))
}

/// All complaints matching `filter`, newest first.
pub async fn find_all(pool: &PgPool, filter: &ComplaintFilter) -> Result<Vec<ComplaintSummary>, AppError> {
    let sql = format!("{SELECT_COMPLAINT} {FILTER_CLAUSE} ORDER BY c.created_at DESC, c.id DESC");
    let rows = sqlx::query_as::<_, ComplaintRow>(&sql)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.pincode.as_deref())
        .bind(filter.user_id)
        .bind(filter.supervisor_id.as_deref())
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(to_summary).collect()
}

/// One page of `find_all`. A page whose offset overflows is a bad request.
pub async fn find_paginated(
    pool: &PgPool,
    filter: &ComplaintFilter,
    page: i64,
    per_page: i64,
) -> Result<ComplaintPage, AppError> {
    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| AppError::BadRequest("page is out of range".to_string()))?;

    let count_sql = format!(
        "SELECT COUNT(*) FROM complaints c \
         LEFT JOIN LATERAL ( \
             SELECT m.status FROM status_messages m \
             WHERE m.complaint_id = c.id ORDER BY m.id DESC LIMIT 1 \
         ) last ON TRUE {FILTER_CLAUSE}"
    );
    let total_count: i64 = sqlx::query_scalar(&count_sql)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.pincode.as_deref())
        .bind(filter.user_id)
        .bind(filter.supervisor_id.as_deref())
        .fetch_one(pool)
        .await?;

    let sql = format!(
        "{SELECT_COMPLAINT} {FILTER_CLAUSE} ORDER BY c.created_at DESC, c.id DESC LIMIT $5 OFFSET $6"
    );
    let rows = sqlx::query_as::<_, ComplaintRow>(&sql)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.pincode.as_deref())
        .bind(filter.user_id)
        .bind(filter.supervisor_id.as_deref())
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(ComplaintPage {
        items: rows.into_iter().map(to_summary).collect::<Result<_, _>>()?,
        page,
        per_page,
        total_count,
    })
}

/// Assign a supervisor to a submitted complaint.
pub async fn assign_supervisor(
    pool: &PgPool,
    complaint_id: i64,
    supervisor_id: &str,
    message: &str,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let (_, status) = current_state(&mut tx, complaint_id).await?;
    status.check_assign().map_err(AppError::BadRequest)?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM supervisors WHERE id = $1)")
        .bind(supervisor_id)
        .fetch_one(&mut *tx)
        .await?;
    if !exists {
        return Err(AppError::BadRequest(format!("Unknown supervisor '{supervisor_id}'")));
    }

    sqlx::query("UPDATE complaints SET supervisor_id = $1 WHERE id = $2")
        .bind(supervisor_id)
        .bind(complaint_id)
        .execute(&mut *tx)
        .await?;
    append_status(&mut tx, complaint_id, ComplaintStatus::SupervisorAssigned, message, &[]).await?;

    tx.commit().await?;
    Ok(())
}

/// Record a supervisor's progress on a complaint assigned to them.
pub async fn update_progress(
    pool: &PgPool,
    complaint_id: i64,
    supervisor_id: &str,
    update: &ProgressUpdate,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let (assigned, status) = current_state(&mut tx, complaint_id).await?;
    if assigned.as_deref() != Some(supervisor_id) {
        return Err(AppError::NotFound);
    }
    status.check_progress(update.status).map_err(AppError::BadRequest)?;

    sqlx::query(
        "UPDATE complaints SET estimated_expense = COALESCE($1, estimated_expense), \
         estimated_end_date = COALESCE($2, estimated_end_date) WHERE id = $3",
    )
    .bind(update.estimated_expense)
    .bind(update.estimated_end_date)
    .bind(complaint_id)
    .execute(&mut *tx)
    .await?;
    append_status(&mut tx, complaint_id, update.status, &update.message, &update.image_urls).await?;

    tx.commit().await?;
    Ok(())
}

/// Reject a non-terminal complaint. Supervisors may only reject their own;
/// anyone else's is NotFound.
pub async fn reject(
    pool: &PgPool,
    complaint_id: i64,
    by: Rejector<'_>,
    message: &str,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let (assigned, status) = current_state(&mut tx, complaint_id).await?;
    if let Rejector::Supervisor(sup) = by {
        if assigned.as_deref() != Some(sup) {
            return Err(AppError::NotFound);
        }
    }
    status.check_reject().map_err(AppError::BadRequest)?;

    append_status(&mut tx, complaint_id, ComplaintStatus::Rejected, message, &[]).await?;

    tx.commit().await?;
    Ok(())
}
