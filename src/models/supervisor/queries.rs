use std::collections::HashMap;

use sqlx::PgPool;

use super::types::*;
use super::workload;
use crate::errors::AppError;
use crate::models::complaint::parse_status;
use crate::models::status::ComplaintStatus;

const PROFILE_COLUMNS: &str = "id, name, email, phone, pincode, created_at";

pub async fn create(pool: &PgPool, new: &NewSupervisor) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO supervisors (id, name, email, phone, password, pincode) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&new.id)
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.password)
    .bind(&new.pincode)
    .execute(pool)
    .await?;
    Ok(())
}

/// Find a supervisor by id for login.
pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Supervisor>, sqlx::Error> {
    sqlx::query_as::<_, Supervisor>(
        "SELECT id, name, email, phone, password, pincode, created_at FROM supervisors WHERE id = $1",
    )
    .bind(id.trim())
    .fetch_optional(pool)
    .await
}

pub async fn find_profile(pool: &PgPool, id: &str) -> Result<Option<SupervisorProfile>, sqlx::Error> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM supervisors WHERE id = $1");
    sqlx::query_as::<_, SupervisorProfile>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Annotate supervisors with task counts and ratings, preserving input order.
async fn with_workload(
    pool: &PgPool,
    supervisors: Vec<SupervisorProfile>,
) -> Result<Vec<SupervisorWorkload>, AppError> {
    if supervisors.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = supervisors.iter().map(|s| s.id.clone()).collect();

    let status_rows: Vec<(String, Option<String>)> = sqlx::query_as(
        "SELECT c.supervisor_id, last.status \
         FROM complaints c \
         LEFT JOIN LATERAL ( \
             SELECT m.status FROM status_messages m \
             WHERE m.complaint_id = c.id ORDER BY m.id DESC LIMIT 1 \
         ) last ON TRUE \
         WHERE c.supervisor_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let rating_rows: Vec<(String, i16)> = sqlx::query_as(
        "SELECT supervisor_id, rating FROM feedback WHERE supervisor_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut statuses: HashMap<String, Vec<Option<ComplaintStatus>>> = HashMap::new();
    for (sup, status) in status_rows {
        let status = status.as_deref().map(parse_status).transpose()?;
        statuses.entry(sup).or_default().push(status);
    }
    let mut ratings: HashMap<String, Vec<i16>> = HashMap::new();
    for (sup, rating) in rating_rows {
        ratings.entry(sup).or_default().push(rating);
    }

    Ok(supervisors
        .into_iter()
        .map(|s| {
            let st = statuses.remove(&s.id).unwrap_or_default();
            let rt = ratings.remove(&s.id).unwrap_or_default();
            workload::summarize(s, &st, &rt)
        })
        .collect())
}

/// All supervisors with their workload, ordered by id.
pub async fn find_all(pool: &PgPool) -> Result<Vec<SupervisorWorkload>, AppError> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM supervisors ORDER BY id");
    let supervisors = sqlx::query_as::<_, SupervisorProfile>(&sql)
        .fetch_all(pool)
        .await?;
    with_workload(pool, supervisors).await
}

pub async fn find_workload(pool: &PgPool, id: &str) -> Result<Option<SupervisorWorkload>, AppError> {
    let Some(profile) = find_profile(pool, id).await? else {
        return Ok(None);
    };
    Ok(with_workload(pool, vec![profile]).await?.pop())
}

/// Supervisors serving `pincode`, least-loaded first.
pub async fn rank_for_pincode(pool: &PgPool, pincode: &str) -> Result<Vec<SupervisorWorkload>, AppError> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM supervisors WHERE pincode = $1 ORDER BY id");
    let supervisors = sqlx::query_as::<_, SupervisorProfile>(&sql)
        .bind(pincode.trim())
        .fetch_all(pool)
        .await?;
    let annotated = with_workload(pool, supervisors).await?;
    Ok(workload::rank(annotated))
}

/// Delete a supervisor whose complaints are all Completed.
///
/// References from complaints, feedback and reports are cleared in the same transaction.
pub async fn delete(pool: &PgPool, id: &str) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM supervisors WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if !exists {
        return Err(AppError::NotFound);
    }

    let raw: Vec<Option<String>> = sqlx::query_scalar(
        "SELECT (SELECT m.status FROM status_messages m WHERE m.complaint_id = c.id \
                 ORDER BY m.id DESC LIMIT 1) \
         FROM complaints c WHERE c.supervisor_id = $1",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;
    let statuses = raw
        .iter()
        .map(|s| s.as_deref().map(parse_status).transpose())
        .collect::<Result<Vec<_>, _>>()?;

    let blockers = workload::deletion_blockers(&statuses);
    if blockers > 0 {
        return Err(AppError::BadRequest(format!(
            "Supervisor still has {} complaint(s) that are not completed",
            blockers
        )));
    }

    for table in ["complaints", "feedback", "reports"] {
        let sql = format!("UPDATE {table} SET supervisor_id = NULL WHERE supervisor_id = $1");
        sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
    }
    sqlx::query("DELETE FROM supervisors WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
