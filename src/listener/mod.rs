// ABOUTME: Observer contract for packaging and deployment lifecycle events.
// ABOUTME: Every event has a no-op default; sinks implement only what they render.

mod identity;

pub use identity::Identity;

use std::path::Path;
use std::time::Duration;

use crate::deploy::{
    DeploymentOptions, DeploymentStatus, ErrorInfo, InstanceCounts, Problem, RevisionLocation,
    UploadedRevision,
};
use crate::types::DeploymentId;

/// Receives informational messages from the archive builder.
pub trait PackagingLogger: Send + Sync {
    fn info(&self, message: &str);
}

/// Lifecycle events reported by `DeploymentClient`.
#[allow(unused_variables)]
pub trait DeploymentListener: Send + Sync {
    fn upload_started(&self, archive: &Path, bucket: &str, key: &str) {}

    fn upload_finished(&self, upload: &UploadedRevision) {}

    fn register_started(&self, application: &str, location: &RevisionLocation) {}

    fn register_finished(&self, application: &str, location: &RevisionLocation) {}

    fn deploy_started(&self, options: &DeploymentOptions, location: &RevisionLocation) {}

    fn deploy_finished(&self, options: &DeploymentOptions, id: &DeploymentId) {}

    fn wait_started(&self, id: &DeploymentId) {}

    fn in_progress(&self, id: &DeploymentId, counts: &InstanceCounts) {}

    /// The deployment failed, or the wait timed out when `timeout` is set.
    /// `status` is the last status seen.
    fn failed(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
        timeout: Option<Duration>,
        error: Option<&ErrorInfo>,
        counts: &InstanceCounts,
    ) {
    }

    fn succeeded(&self, id: &DeploymentId, counts: &InstanceCounts) {}

    fn exception(&self, problem: &Problem) {}
}

/// Listener that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl DeploymentListener for NoopListener {}

/// "1 instance" / "N instances".
pub fn instances(count: u32) -> String {
    if count == 1 {
        "1 instance".to_string()
    } else {
        format!("{count} instances")
    }
}

/// One-line summary of instance progress.
pub fn instance_summary(counts: &InstanceCounts) -> String {
    format!(
        "{}: {} succeeded, {} failed, {} pending, {} skipped, {} in progress",
        instances(counts.total()),
        counts.succeeded,
        counts.failed,
        counts.pending,
        counts.skipped,
        counts.in_progress
    )
}
