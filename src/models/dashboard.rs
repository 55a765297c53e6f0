use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use super::status::{Bucket, ComplaintStatus};

// ---------- Types ----------

/// Complaint counts for one pincode, by current status.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct PincodeRollup {
    pub pincode: String,
    pub pending: i64,
    pub ongoing: i64,
    pub completed: i64,
    pub rejected: i64,
    pub total: i64,
}

/// Distinct (complaint, status) pairs logged on one calendar day (UTC).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyRollup {
    pub day: NaiveDate,
    pub pending: i64,
    pub ongoing: i64,
    pub completed: i64,
    pub rejected: i64,
}

/// City-wide headline numbers for the mayor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CitySummary {
    pub total_complaints: i64,
    pub pending: i64,
    pub ongoing: i64,
    pub completed: i64,
    pub rejected: i64,
    pub supervisors: i64,
    pub average_rating: Option<f64>,
    pub total_reported_cost: f64,
}

// ---------- Queries ----------

/// Status labels that fall into `bucket`, for binding as a TEXT[] parameter.
fn labels(bucket: Bucket) -> Vec<String> {
    ComplaintStatus::ALL
        .iter()
        .filter(|s| s.bucket() == bucket)
        .map(|s| s.as_str().to_string())
        .collect()
}

/// Per-pincode counts by each complaint's current status.
pub async fn pincode_rollup(pool: &PgPool) -> Result<Vec<PincodeRollup>, sqlx::Error> {
    sqlx::query_as::<_, PincodeRollup>(
        "WITH current AS ( \
             SELECT c.pincode, last.status \
             FROM complaints c \
             LEFT JOIN LATERAL ( \
                 SELECT m.status FROM status_messages m \
                 WHERE m.complaint_id = c.id ORDER BY m.id DESC LIMIT 1 \
             ) last ON TRUE \
         ) \
         SELECT pincode, \
                COUNT(*) FILTER (WHERE status = ANY($1)) AS pending, \
                COUNT(*) FILTER (WHERE status = ANY($2)) AS ongoing, \
                COUNT(*) FILTER (WHERE status = ANY($3)) AS completed, \
                COUNT(*) FILTER (WHERE status = ANY($4)) AS rejected, \
                COUNT(*) AS total \
         FROM current \
         GROUP BY pincode \
         ORDER BY pincode",
    )
    .bind(labels(Bucket::Pending))
    .bind(labels(Bucket::Ongoing))
    .bind(labels(Bucket::Completed))
    .bind(labels(Bucket::Rejected))
    .fetch_all(pool)
    .await
}

/// Per-day counts from the status log, optionally limited to the last `days` days.
pub async fn daily_rollup(pool: &PgPool, days: Option<i32>) -> Result<Vec<DailyRollup>, sqlx::Error> {
    sqlx::query_as::<_, DailyRollup>(
        "SELECT day, \
                COUNT(*) FILTER (WHERE status = ANY($1)) AS pending, \
                COUNT(*) FILTER (WHERE status = ANY($2)) AS ongoing, \
                COUNT(*) FILTER (WHERE status = ANY($3)) AS completed, \
                COUNT(*) FILTER (WHERE status = ANY($4)) AS rejected \
         FROM ( \
             SELECT DISTINCT (m.created_at AT TIME ZONE 'UTC')::DATE AS day, m.complaint_id, m.status \
             FROM status_messages m \
             WHERE $5::INT IS NULL OR m.created_at >= NOW() - make_interval(days => $5::INT) \
         ) pairs \
         GROUP BY day \
         ORDER BY day",
    )
    .bind(labels(Bucket::Pending))
    .bind(labels(Bucket::Ongoing))
    .bind(labels(Bucket::Completed))
    .bind(labels(Bucket::Rejected))
    .bind(days)
    .fetch_all(pool)
    .await
}

/// Headline numbers: bucket totals folded from the pincode rollup plus rating and cost.
pub async fn city_summary(pool: &PgPool) -> Result<CitySummary, sqlx::Error> {
    let by_pincode = pincode_rollup(pool).await?;
    let mut summary = by_pincode.iter().fold(CitySummary::default(), |mut acc, p| {
        acc.total_complaints += p.total;
        acc.pending += p.pending;
        acc.ongoing += p.ongoing;
        acc.completed += p.completed;
        acc.rejected += p.rejected;
        acc
    });

    summary.average_rating = sqlx::query_scalar("SELECT AVG(rating)::FLOAT8 FROM feedback")
        .fetch_one(pool)
        .await?;
    summary.total_reported_cost = sqlx::query_scalar(
        "SELECT COALESCE(SUM(labour_cost + material_cost + equipment_cost + other_cost), 0)::FLOAT8 \
         FROM reports",
    )
    .fetch_one(pool)
    .await?;
    summary.supervisors = sqlx::query_scalar("SELECT COUNT(*) FROM supervisors")
        .fetch_one(pool)
        .await?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_labels_partition_all_statuses() {
        let all: usize = [Bucket::Pending, Bucket::Ongoing, Bucket::Completed, Bucket::Rejected]
            .into_iter()
            .map(|b| labels(b).len())
            .sum();
        assert_eq!(all, ComplaintStatus::ALL.len());
        assert_eq!(labels(Bucket::Pending), vec!["Submitted", "Supervisor Assigned", "Inspected"]);
    }
}
