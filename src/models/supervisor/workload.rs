//! Workload annotation and ranking used when an admin picks a supervisor.

use crate::models::status::ComplaintStatus;

use super::types::{SupervisorProfile, SupervisorWorkload};

/// Mean of the ratings, or `None` when there are none.
pub fn average_rating(ratings: &[i16]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    Some(sum as f64 / ratings.len() as f64)
}

/// Count complaints by status. `None` stands for a complaint with no status history.
pub fn summarize(
    supervisor: SupervisorProfile,
    statuses: &[Option<ComplaintStatus>],
    ratings: &[i16],
) -> SupervisorWorkload {
    let completed_tasks = statuses
        .iter()
        .filter(|s| **s == Some(ComplaintStatus::Completed))
        .count() as i64;
    let pending_tasks = statuses
        .iter()
        .filter(|s| s.is_some_and(|st| st.is_pending_task()))
        .count() as i64;

    SupervisorWorkload {
        supervisor,
        completed_tasks,
        pending_tasks,
        average_rating: average_rating(ratings),
    }
}

/// Least-loaded first. The sort is stable, so ties keep their input order.
pub fn rank(mut supervisors: Vec<SupervisorWorkload>) -> Vec<SupervisorWorkload> {
    supervisors.sort_by_key(|s| s.pending_tasks);
    supervisors
}

/// Number of complaints that stop a supervisor from being deleted (anything not Completed).
pub fn deletion_blockers(statuses: &[Option<ComplaintStatus>]) -> usize {
    statuses
        .iter()
        .filter(|s| **s != Some(ComplaintStatus::Completed))
        .count()
}
