// ABOUTME: Drives the upload, register, and deploy stages against remote collaborators.
// ABOUTME: Polls deployments to a terminal state; failures are reported, never returned.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::listener::DeploymentListener;
use crate::types::DeploymentId;

use super::clock::{Clock, SystemClock};
use super::description::{DEPLOY_PREFIX, REGISTER_PREFIX, describe};
use super::failure::{RemoteError, report};
use super::services::{
    CreateDeploymentRequest, DeployService, DeploymentOptions, ObjectStore,
    RegisterRevisionRequest, RevisionLocation, UploadedRevision,
};
use super::state::DeploymentStatus;

/// How long to wait for a deployment and how often to check on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30 * 60),
            poll_interval: Duration::from_secs(15),
        }
    }
}

/// Terminal result of waiting on a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Succeeded,
    /// Completed without success (failed or stopped).
    Failed(DeploymentStatus),
    /// The local wait gave up; the remote deployment keeps running.
    TimedOut,
}

/// Remote lifecycle driver bound to one object store and deployment service.
///
/// Each stage returns `None`/`false` after a failure has been reported to the
/// listener, so callers decide whether to continue without handling errors.
pub struct DeploymentClient<S, D, C = SystemClock> {
    store: S,
    service: D,
    clock: C,
    listener: Arc<dyn DeploymentListener>,
}

impl<S, D> DeploymentClient<S, D, SystemClock>
where
    S: ObjectStore,
    D: DeployService,
{
    pub fn new(store: S, service: D, listener: Arc<dyn DeploymentListener>) -> Self {
        Self {
            store,
            service,
            clock: SystemClock,
            listener,
        }
    }
}

impl<S, D, C> DeploymentClient<S, D, C>
where
    S: ObjectStore,
    D: DeployService,
    C: Clock,
{
    /// Replace the clock used by the poll loop.
    pub fn with_clock<T: Clock>(self, clock: T) -> DeploymentClient<S, D, T> {
        DeploymentClient {
            store: self.store,
            service: self.service,
            clock,
            listener: self.listener,
        }
    }

    pub fn listener(&self) -> &Arc<dyn DeploymentListener> {
        &self.listener
    }

    /// Upload the archive to `bucket/key`.
    pub async fn upload_revision(
        &self,
        archive: &Path,
        bucket: &str,
        key: &str,
    ) -> Option<UploadedRevision> {
        self.listener.upload_started(archive, bucket, key);
        tracing::info!("uploading {} to {bucket}/{key}", archive.display());

        match self.store.put_object(bucket, key, archive).await {
            Ok(output) => {
                let uploaded = UploadedRevision {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    url: self.store.object_url(bucket, key),
                    version: output.version_id,
                    etag: output.etag,
                };
                self.listener.upload_finished(&uploaded);
                Some(uploaded)
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Register a stored revision with the application. Returns `false` on failure.
    pub async fn register_revision(
        &self,
        location: &RevisionLocation,
        application: &str,
        description: Option<&str>,
    ) -> bool {
        self.listener.register_started(application, location);
        tracing::info!(
            "registering {}/{} ({}) with {application}",
            location.bucket,
            location.key,
            location.bundle_type
        );

        let request = RegisterRevisionRequest {
            application: application.to_string(),
            location: location.clone(),
            description: describe(REGISTER_PREFIX, description),
        };

        match self.service.register_application_revision(&request).await {
            Ok(()) => {
                self.listener.register_finished(application, location);
                true
            }
            Err(e) => {
                report(self.listener.as_ref(), &e);
                false
            }
        }
    }

    /// Create a deployment of a stored revision.
    pub async fn deploy_revision(
        &self,
        location: &RevisionLocation,
        options: &DeploymentOptions,
    ) -> Option<DeploymentId> {
        self.listener.deploy_started(options, location);
        tracing::info!(
            "creating deployment of {}/{} to {} / {}",
            location.bucket,
            location.key,
            options.application,
            options.deployment_group
        );

        let request = CreateDeploymentRequest {
            application: options.application.clone(),
            deployment_group: options.deployment_group.clone(),
            location: location.clone(),
            deployment_config: options.deployment_config.clone(),
            file_exists_behavior: options.file_exists_behavior,
            rollback_on_failure: options.rollback_on_failure,
            description: describe(DEPLOY_PREFIX, options.description.as_deref()),
        };

        match self.service.create_deployment(&request).await {
            Ok(id) => {
                self.listener.deploy_finished(options, &id);
                Some(id)
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Create a deployment and poll it until it completes or the wait times out.
    pub async fn deploy_revision_and_wait(
        &self,
        location: &RevisionLocation,
        options: &DeploymentOptions,
        wait: WaitSettings,
    ) -> Option<WaitOutcome> {
        let id = self.deploy_revision(location, options).await?;
        self.wait_for_completion(&id, wait).await
    }

    /// Poll an existing deployment until it completes or the wait times out.
    pub async fn wait_for_completion(
        &self,
        id: &DeploymentId,
        wait: WaitSettings,
    ) -> Option<WaitOutcome> {
        match self.wait_for_deployment(id, wait).await {
            Ok(outcome) => Some(outcome),
            Err(e) => self.fail(&e),
        }
    }

    /// Poll until the deployment reports a completion time or the wait times out.
    ///
    /// A timeout stops only the local wait. An interrupted sleep is treated as
    /// an unexpected failure.
    async fn wait_for_deployment(
        &self,
        id: &DeploymentId,
        wait: WaitSettings,
    ) -> Result<WaitOutcome, RemoteError> {
        self.listener.wait_started(id);

        let mut info = self.service.get_deployment(id).await?;
        let started = info.start_time.unwrap_or_else(|| self.clock.now());

        while !info.is_complete() {
            self.listener.in_progress(id, &info.instance_counts);

            let elapsed = (self.clock.now() - started)
                .to_std()
                .unwrap_or(Duration::ZERO);
            if elapsed > wait.timeout {
                tracing::warn!(
                    "deployment {id} did not complete within {}s",
                    wait.timeout.as_secs()
                );
                self.listener.failed(
                    id,
                    info.status,
                    Some(wait.timeout),
                    info.error_info.as_ref(),
                    &info.instance_counts,
                );
                return Ok(WaitOutcome::TimedOut);
            }

            self.clock
                .sleep(wait.poll_interval)
                .await
                .map_err(|e| RemoteError::Unexpected(e.to_string()))?;

            info = self.service.get_deployment(id).await?;
            tracing::debug!("deployment {id} status: {}", info.status);
        }

        if info.status == DeploymentStatus::Succeeded {
            self.listener.succeeded(id, &info.instance_counts);
            Ok(WaitOutcome::Succeeded)
        } else {
            self.listener.failed(
                id,
                info.status,
                None,
                info.error_info.as_ref(),
                &info.instance_counts,
            );
            Ok(WaitOutcome::Failed(info.status))
        }
    }

    fn fail<T>(&self, err: &RemoteError) -> Option<T> {
        report(self.listener.as_ref(), err);
        None
    }
}
