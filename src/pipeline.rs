// ABOUTME: Runs the full revision lifecycle: package, upload, register, deploy, wait.
// ABOUTME: Stops at the first reported problem and honors cancellation between stages.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::deploy::{
    Clock, DeployService, DeploymentClient, DeploymentOptions, ObjectStore, RevisionLocation,
    UploadedRevision, WaitOutcome, WaitSettings,
};
use crate::error::Result;
use crate::listener::PackagingLogger;
use crate::revision::{ArchiveBuilder, RevisionSpec};
use crate::types::{BundleType, DeploymentId};

/// How far into the lifecycle a run goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentSteps {
    Upload,
    Register,
    Deploy,
    #[default]
    DeployAndWait,
}

impl DeploymentSteps {
    pub fn registers(self) -> bool {
        self >= DeploymentSteps::Register
    }

    pub fn deploys(self) -> bool {
        self >= DeploymentSteps::Deploy
    }

    pub fn waits(self) -> bool {
        self == DeploymentSteps::DeployAndWait
    }
}

/// Shared cancellation signal, checked between stages.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle stage, used to report where a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Upload,
    Register,
    Deploy,
    Wait,
}

/// Everything a run needs besides the remote collaborators.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub revision: RevisionSpec,
    pub bucket: String,
    pub key: String,
    pub options: DeploymentOptions,
    pub wait: WaitSettings,
    pub steps: DeploymentSteps,
}

/// What a run achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub archive: Option<PathBuf>,
    pub upload: Option<UploadedRevision>,
    pub registered: Option<RevisionLocation>,
    pub deployment: Option<DeploymentId>,
    pub wait: Option<WaitOutcome>,
    /// Stage whose problem ended the run.
    pub stopped_at: Option<Stage>,
    pub cancelled: bool,
}

impl PipelineOutcome {
    /// Every requested stage ran and, when waiting, the deployment succeeded.
    pub fn is_success(&self) -> bool {
        self.stopped_at.is_none()
            && !self.cancelled
            && !matches!(
                self.wait,
                Some(WaitOutcome::Failed(_)) | Some(WaitOutcome::TimedOut)
            )
    }
}

/// Packages a revision and drives it through the requested lifecycle stages.
pub struct RevisionPipeline<S, D, C> {
    client: DeploymentClient<S, D, C>,
    settings: PipelineSettings,
    cancel: CancelFlag,
    packaging_logger: Option<Arc<dyn PackagingLogger>>,
}

impl<S, D, C> RevisionPipeline<S, D, C>
where
    S: ObjectStore,
    D: DeployService,
    C: Clock,
{
    pub fn new(client: DeploymentClient<S, D, C>, settings: PipelineSettings) -> Self {
        Self {
            client,
            settings,
            cancel: CancelFlag::new(),
            packaging_logger: None,
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_packaging_logger(mut self, logger: Arc<dyn PackagingLogger>) -> Self {
        self.packaging_logger = Some(logger);
        self
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Run the pipeline.
    ///
    /// Configuration and packaging errors are returned. Remote failures are
    /// reported to the listener and recorded in `stopped_at`.
    pub async fn run(&self) -> Result<PipelineOutcome> {
        let settings = &self.settings;
        let bundle_type = BundleType::from_key(&settings.key)?;
        let mut outcome = PipelineOutcome::default();

        let mut builder = ArchiveBuilder::new(settings.revision.clone());
        if let Some(logger) = &self.packaging_logger {
            builder = builder.with_logger(Arc::clone(logger));
        }
        let archive = builder.build()?;
        tracing::info!("revision archive ready at {}", archive.display());
        outcome.archive = Some(archive.clone());

        if self.cancelled(&mut outcome) {
            return Ok(outcome);
        }
        let Some(upload) = self
            .client
            .upload_revision(&archive, &settings.bucket, &settings.key)
            .await
        else {
            outcome.stopped_at = Some(Stage::Upload);
            return Ok(outcome);
        };
        let location = upload.location(bundle_type);
        outcome.upload = Some(upload);

        if !settings.steps.registers() || self.cancelled(&mut outcome) {
            return Ok(outcome);
        }
        let registered = self
            .client
            .register_revision(
                &location,
                &settings.options.application,
                settings.options.description.as_deref(),
            )
            .await;
        if !registered {
            outcome.stopped_at = Some(Stage::Register);
            return Ok(outcome);
        }
        outcome.registered = Some(location.clone());

        if !settings.steps.deploys() || self.cancelled(&mut outcome) {
            return Ok(outcome);
        }
        let Some(id) = self
            .client
            .deploy_revision(&location, &settings.options)
            .await
        else {
            outcome.stopped_at = Some(Stage::Deploy);
            return Ok(outcome);
        };
        outcome.deployment = Some(id.clone());

        if !settings.steps.waits() || self.cancelled(&mut outcome) {
            return Ok(outcome);
        }
        match self.client.wait_for_completion(&id, settings.wait).await {
            Some(wait) => outcome.wait = Some(wait),
            None => outcome.stopped_at = Some(Stage::Wait),
        }
        Ok(outcome)
    }

    fn cancelled(&self, outcome: &mut PipelineOutcome) -> bool {
        if self.cancel.is_cancelled() {
            tracing::warn!("pipeline cancelled, skipping remaining stages");
            outcome.cancelled = true;
        }
        outcome.cancelled
    }
}
