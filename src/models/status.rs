use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of a complaint. Serialized with the labels shown to citizens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Submitted,
    #[serde(rename = "Supervisor Assigned")]
    SupervisorAssigned,
    Inspected,
    Ongoing,
    Completed,
    Rejected,
}

/// Dashboard grouping of statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Pending,
    Ongoing,
    Completed,
    Rejected,
}

/// Statuses that count against a supervisor's open workload.
pub const PENDING_TASK_STATUSES: [ComplaintStatus; 3] = [
    ComplaintStatus::SupervisorAssigned,
    ComplaintStatus::Inspected,
    ComplaintStatus::Ongoing,
];

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 6] = [
        ComplaintStatus::Submitted,
        ComplaintStatus::SupervisorAssigned,
        ComplaintStatus::Inspected,
        ComplaintStatus::Ongoing,
        ComplaintStatus::Completed,
        ComplaintStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Submitted => "Submitted",
            ComplaintStatus::SupervisorAssigned => "Supervisor Assigned",
            ComplaintStatus::Inspected => "Inspected",
            ComplaintStatus::Ongoing => "Ongoing",
            ComplaintStatus::Completed => "Completed",
            ComplaintStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ComplaintStatus::Completed | ComplaintStatus::Rejected)
    }

    pub fn is_pending_task(&self) -> bool {
        PENDING_TASK_STATUSES.contains(self)
    }

    pub fn bucket(&self) -> Bucket {
        match self {
            ComplaintStatus::Submitted
            | ComplaintStatus::SupervisorAssigned
            | ComplaintStatus::Inspected => Bucket::Pending,
            ComplaintStatus::Ongoing => Bucket::Ongoing,
            ComplaintStatus::Completed => Bucket::Completed,
            ComplaintStatus::Rejected => Bucket::Rejected,
        }
    }

    /// Position along the happy path. Rejected sits outside it.
    fn stage(&self) -> Option<u8> {
        match self {
            ComplaintStatus::Submitted => Some(0),
            ComplaintStatus::SupervisorAssigned => Some(1),
            ComplaintStatus::Inspected => Some(2),
            ComplaintStatus::Ongoing => Some(3),
            ComplaintStatus::Completed => Some(4),
            ComplaintStatus::Rejected => None,
        }
    }

    /// Check a supervisor progress update from `self` to `next`.
    ///
    /// Updates move forward along Supervisor Assigned → Inspected → Ongoing → Completed,
    /// optionally skipping stages. Rejection and assignment have their own operations.
    pub fn check_progress(&self, next: ComplaintStatus) -> Result<(), String> {
        if self.is_terminal() {
            return Err(format!("Complaint is already {}", self));
        }
        if *self == ComplaintStatus::Submitted {
            return Err("Complaint has no supervisor assigned yet".to_string());
        }
        match (self.stage(), next.stage()) {
            (_, None) => Err("Use the reject action to reject a complaint".to_string()),
            (Some(from), Some(to)) if to > from && next != ComplaintStatus::SupervisorAssigned => Ok(()),
            _ => Err(format!("Cannot move a complaint from {} to {}", self, next)),
        }
    }

    pub fn check_reject(&self) -> Result<(), String> {
        if self.is_terminal() {
            return Err(format!("Complaint is already {}", self));
        }
        Ok(())
    }

    pub fn check_assign(&self) -> Result<(), String> {
        if *self != ComplaintStatus::Submitted {
            return Err(format!("Only submitted complaints can be assigned (current: {})", self));
        }
        Ok(())
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown complaint status '{s}'"))
    }
}
