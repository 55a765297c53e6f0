//! Progress timeline shown on complaint detail pages.
//!
//! The status message log is the single source of truth: the current status of a
//! complaint is the status of its last message, and the timeline is the log itself
//! plus a pending "Completed" step while the complaint is still open.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::status::ComplaintStatus;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The part of a status message the timeline needs.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineStep {
    pub status: ComplaintStatus,
    /// `YYYY-MM-DD`, or empty when no date is known.
    pub date: String,
    pub completed: bool,
}

/// Status of the most recent entry. `None` for an empty log.
pub fn current_status(entries: &[StatusEntry]) -> Option<ComplaintStatus> {
    entries.last().map(|e| e.status)
}

/// Build the timeline from entries in append order.
///
/// Entries are trusted to already be chronological; nothing is reordered or deduplicated.
pub fn derive_timeline(entries: &[StatusEntry], estimated_end: Option<NaiveDate>) -> Vec<TimelineStep> {
    let mut steps: Vec<TimelineStep> = entries
        .iter()
        .map(|e| TimelineStep {
            status: e.status,
            date: e.created_at.format(DATE_FORMAT).to_string(),
            completed: true,
        })
        .collect();

    let open = current_status(entries).is_none_or(|st| !st.is_terminal());
    if open {
        steps.push(TimelineStep {
            status: ComplaintStatus::Completed,
            date: estimated_end
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            completed: false,
        });
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ComplaintStatus::*;

    fn entry(status: ComplaintStatus, day: u32) -> StatusEntry {
        StatusEntry {
            status,
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 10, 30, 0).unwrap(),
        }
    }

    fn step(status: ComplaintStatus, date: &str, completed: bool) -> TimelineStep {
        TimelineStep { status, date: date.to_string(), completed }
    }

    #[test]
    fn open_complaint_without_estimate_gets_blank_pending_step() {
        let entries = [entry(Submitted, 1), entry(SupervisorAssigned, 2), entry(Inspected, 3)];
        let timeline = derive_timeline(&entries, None);
        assert_eq!(
            timeline,
            vec![
                step(Submitted, "2024-03-01", true),
                step(SupervisorAssigned, "2024-03-02", true),
                step(Inspected, "2024-03-03", true),
                step(Completed, "", false),
            ]
        );
    }

    #[test]
    fn pending_step_carries_estimated_date() {
        let entries = [entry(Submitted, 1), entry(Ongoing, 5)];
        let est = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        let timeline = derive_timeline(&entries, Some(est));
        assert_eq!(timeline.last(), Some(&step(Completed, "2024-04-10", false)));
    }

    #[test]
    fn terminal_complaints_get_no_synthetic_step() {
        for terminal in [Completed, Rejected] {
            let entries = [entry(Submitted, 1), entry(terminal, 2)];
            let timeline = derive_timeline(&entries, None);
            assert_eq!(timeline.len(), 2);
            assert!(timeline.iter().all(|s| s.completed));
            assert_eq!(timeline[1].status, terminal);
        }
    }

    #[test]
    fn order_and_duplicates_are_preserved() {
        let entries = [entry(Submitted, 4), entry(Submitted, 2)];
        let timeline = derive_timeline(&entries, None);
        assert_eq!(timeline[0].date, "2024-03-04");
        assert_eq!(timeline[1].date, "2024-03-02");
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn empty_log_has_no_current_status() {
        assert_eq!(current_status(&[]), None);
        assert_eq!(derive_timeline(&[], None), vec![step(Completed, "", false)]);
    }

    #[test]
    fn current_status_is_last_entry() {
        let entries = [entry(Submitted, 1), entry(Rejected, 2)];
        assert_eq!(current_status(&entries), Some(Rejected));
    }
}
