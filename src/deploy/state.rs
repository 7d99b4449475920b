// ABOUTME: Deployment records as reported by the deployment service.
// ABOUTME: Status values, per-instance progress counts, and error details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::DeploymentId;

/// Lifecycle status of a remote deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeploymentStatus {
    Created,
    Queued,
    InProgress,
    Succeeded,
    Failed,
    Stopped,
    #[default]
    Unknown,
}

impl DeploymentStatus {
    /// Whether the deployment has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeploymentStatus::Succeeded | DeploymentStatus::Failed | DeploymentStatus::Stopped
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Created => "Created",
            DeploymentStatus::Queued => "Queued",
            DeploymentStatus::InProgress => "InProgress",
            DeploymentStatus::Succeeded => "Succeeded",
            DeploymentStatus::Failed => "Failed",
            DeploymentStatus::Stopped => "Stopped",
            DeploymentStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate per-host counts across deployment progress buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstanceCounts {
    pub succeeded: u32,
    pub failed: u32,
    pub pending: u32,
    pub skipped: u32,
    pub in_progress: u32,
}

impl InstanceCounts {
    pub fn total(&self) -> u32 {
        self.succeeded + self.failed + self.pending + self.skipped + self.in_progress
    }
}

/// Error details attached to a failed or stopped deployment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Snapshot of a deployment, re-fetched on every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentInfo {
    pub id: DeploymentId,
    pub status: DeploymentStatus,
    pub instance_counts: InstanceCounts,
    pub error_info: Option<ErrorInfo>,
    pub start_time: Option<DateTime<Utc>>,
    pub complete_time: Option<DateTime<Utc>>,
}

impl DeploymentInfo {
    pub fn is_complete(&self) -> bool {
        self.complete_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(DeploymentStatus::Succeeded.is_terminal());
        assert!(DeploymentStatus::Failed.is_terminal());
        assert!(DeploymentStatus::Stopped.is_terminal());
        assert!(!DeploymentStatus::InProgress.is_terminal());
        assert!(!DeploymentStatus::Unknown.is_terminal());
    }

    #[test]
    fn counts_total() {
        let counts = InstanceCounts {
            succeeded: 2,
            failed: 1,
            pending: 3,
            skipped: 0,
            in_progress: 4,
        };
        assert_eq!(counts.total(), 10);
    }
}
