// ABOUTME: Output formatting for CLI feedback and the lifecycle notification sink.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::deploy::{
    DeploymentOptions, DeploymentStatus, ErrorInfo, InstanceCounts, Problem, RevisionLocation,
    UploadedRevision,
};
use crate::listener::{DeploymentListener, Identity, PackagingLogger, instance_summary};
use crate::types::DeploymentId;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    #[default]
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
#[derive(Debug)]
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet mode, an event line in json mode).
    pub fn progress(&self, message: &str) {
        self.event("progress", message, None);
    }

    /// Print a named lifecycle event.
    pub fn event(&self, event: &str, message: &str, identity: Option<u64>) {
        match self.mode {
            OutputMode::Normal => println!("{message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => println!("{}", self.json(event, message, identity, None)),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                println!("{message}");
            }
            OutputMode::Json => println!("{}", self.json("success", message, None, None)),
        }
    }

    /// Print a warning message.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => eprintln!("{}", self.json("warning", message, None, None)),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        self.problem("error", message, None, None);
    }

    /// Print a problem with optional identity fingerprint and multi-line details.
    pub fn problem(&self, event: &str, message: &str, identity: Option<u64>, details: Option<&str>) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
                if let Some(details) = details {
                    for line in details.lines() {
                        eprintln!("  {line}");
                    }
                }
            }
            OutputMode::Json => eprintln!("{}", self.json(event, message, identity, details)),
        }
    }

    fn json(
        &self,
        event: &str,
        message: &str,
        identity: Option<u64>,
        details: Option<&str>,
    ) -> String {
        let event = JsonEvent {
            event,
            message,
            identity,
            details,
            duration_secs: if self.start_time.is_some() {
                Some(self.elapsed_secs())
            } else {
                None
            },
        };
        serde_json::to_string(&event).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

/// Notification sink rendering lifecycle events through `Output`.
#[derive(Debug)]
pub struct OutputListener {
    output: Output,
    identity: Identity,
}

impl OutputListener {
    pub fn new(output: Output, identity: Identity) -> Self {
        Self { output, identity }
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Fingerprint of a completed but unsuccessful deployment.
    fn failure_identity(&self, status: DeploymentStatus, error: Option<&ErrorInfo>) -> u64 {
        let code = error.and_then(|e| e.code.as_deref()).unwrap_or_default();
        self.identity.fingerprint(&[code, status.as_str()])
    }
}

impl PackagingLogger for OutputListener {
    fn info(&self, message: &str) {
        self.output.event("packaging", message, None);
    }
}

impl DeploymentListener for OutputListener {
    fn upload_started(&self, archive: &Path, bucket: &str, key: &str) {
        self.output.event(
            "upload_started",
            &format!(
                "Uploading application revision {} to s3://{bucket}/{key}",
                archive.display()
            ),
            None,
        );
    }

    fn upload_finished(&self, upload: &UploadedRevision) {
        let mut message = format!("Uploaded application revision {}", upload.url);
        if let Some(version) = &upload.version {
            message.push_str(&format!(", version: {version}"));
        }
        if let Some(etag) = &upload.etag {
            message.push_str(&format!(", ETag: {etag}"));
        }
        self.output.event("upload_finished", &message, None);
    }

    fn register_started(&self, application: &str, location: &RevisionLocation) {
        self.output.event(
            "register_started",
            &format!(
                "Registering application revision s3://{}/{} ({}) with application {application}",
                location.bucket, location.key, location.bundle_type
            ),
            None,
        );
    }

    fn register_finished(&self, application: &str, location: &RevisionLocation) {
        self.output.event(
            "register_finished",
            &format!(
                "Registered application revision s3://{}/{} with application {application}",
                location.bucket, location.key
            ),
            None,
        );
    }

    fn deploy_started(&self, options: &DeploymentOptions, _location: &RevisionLocation) {
        let config = options
            .deployment_config
            .as_deref()
            .map(|c| format!(" using {c}"))
            .unwrap_or_default();
        self.output.event(
            "deploy_started",
            &format!(
                "Creating deployment to deployment group {} of application {}{config}",
                options.deployment_group, options.application
            ),
            None,
        );
    }

    fn deploy_finished(&self, _options: &DeploymentOptions, id: &DeploymentId) {
        self.output
            .event("deploy_finished", &format!("Deployment {id} created"), None);
    }

    fn wait_started(&self, id: &DeploymentId) {
        self.output.event(
            "wait_started",
            &format!("Waiting for deployment {id} to finish"),
            None,
        );
    }

    fn in_progress(&self, id: &DeploymentId, counts: &InstanceCounts) {
        self.output.event(
            "in_progress",
            &format!("Deployment {id} in progress, {}", instance_summary(counts)),
            None,
        );
    }

    fn failed(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
        timeout: Option<Duration>,
        error: Option<&ErrorInfo>,
        counts: &InstanceCounts,
    ) {
        match timeout {
            Some(timeout) => {
                let secs = timeout.as_secs().to_string();
                self.output.problem(
                    "timeout",
                    &format!(
                        "Timeout {secs}s exceeded, deployment {id} is still running, {}",
                        instance_summary(counts)
                    ),
                    Some(self.identity.fingerprint(&["timeout", &secs])),
                    None,
                );
            }
            None => {
                let code = error
                    .and_then(|e| e.code.as_deref())
                    .map(|c| format!(" ({c})"))
                    .unwrap_or_default();
                let reason = error
                    .and_then(|e| e.message.as_deref())
                    .map(|m| format!(": {m}"))
                    .unwrap_or_default();
                self.output.problem(
                    "failed",
                    &format!(
                        "Deployment {id} {}{code}{reason}, {}",
                        status.as_str().to_lowercase(),
                        instance_summary(counts)
                    ),
                    Some(self.failure_identity(status, error)),
                    None,
                );
            }
        }
    }

    fn succeeded(&self, id: &DeploymentId, counts: &InstanceCounts) {
        self.output.success(&format!(
            "Deployment {id} succeeded, {}",
            instance_summary(counts)
        ));
    }

    fn exception(&self, problem: &Problem) {
        let identity = problem
            .identity
            .as_deref()
            .map(|part| self.identity.fingerprint(&[part]));
        self.output.problem(
            "exception",
            &problem.message,
            identity,
            problem.details.as_deref(),
        );
    }
}
