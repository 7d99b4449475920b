// ABOUTME: Test support utilities.
// ABOUTME: In-memory remote collaborators, a recording listener, and a manual clock.

// Each test binary only uses some of these helpers, so allow dead_code.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use revdeploy::deploy::{
    Clock, CreateDeploymentRequest, DeployService, DeploymentInfo, DeploymentOptions,
    DeploymentStatus, ErrorInfo, InstanceCounts, Interrupted, ObjectStore, Problem,
    PutObjectOutput, RegisterRevisionRequest, RemoteError, RevisionLocation, UploadedRevision,
};
use revdeploy::listener::{DeploymentListener, PackagingLogger};
use revdeploy::types::DeploymentId;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("revdeploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Write `files` (relative path, content) under `root`, creating parent directories.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
}

/// Read every entry of a zip archive as (name, content), in archive order.
pub fn read_archive(path: &Path) -> Vec<(String, String)> {
    let file = fs::File::open(path).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut entry = zip.by_index(i).unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut entry, &mut content).unwrap();
            (entry.name().to_string(), content)
        })
        .collect()
}

pub fn service_error(code: &str) -> RemoteError {
    RemoteError::Service {
        service_name: "CodeDeploy".to_string(),
        error_type: "Client".to_string(),
        status_code: 400,
        error_code: code.to_string(),
        request_id: Some("req-1".to_string()),
        message: format!("{code} happened."),
    }
}

pub fn options() -> DeploymentOptions {
    DeploymentOptions {
        application: "shop".to_string(),
        deployment_group: "prod".to_string(),
        ..Default::default()
    }
}

// Object store

#[derive(Debug, Default)]
struct StoreState {
    fail_with: Option<RemoteError>,
    uploads: Vec<(String, String, Vec<u8>)>,
}

/// Object store keeping uploaded bytes in memory.
#[derive(Debug, Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<StoreState>>,
}

impl FakeStore {
    pub fn failing(err: RemoteError) -> Self {
        let store = Self::default();
        store.state.lock().fail_with = Some(err);
        store
    }

    pub fn uploads(&self) -> Vec<(String, String, Vec<u8>)> {
        self.state.lock().uploads.clone()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        file: &Path,
    ) -> Result<PutObjectOutput, RemoteError> {
        let mut state = self.state.lock();
        if let Some(err) = state.fail_with.take() {
            return Err(err);
        }
        let bytes = fs::read(file).map_err(|e| RemoteError::Client(e.to_string()))?;
        state
            .uploads
            .push((bucket.to_string(), key.to_string(), bytes));
        Ok(PutObjectOutput {
            version_id: Some("v1".to_string()),
            etag: Some("\"etag-1\"".to_string()),
        })
    }

    fn region(&self) -> Option<&str> {
        Some("eu-west-1")
    }
}

// Deployment service

#[derive(Debug, Default)]
struct ServiceState {
    register_error: Option<RemoteError>,
    create_error: Option<RemoteError>,
    get_error: Option<RemoteError>,
    snapshots: VecDeque<DeploymentInfo>,
    registered: Vec<RegisterRevisionRequest>,
    created: Vec<CreateDeploymentRequest>,
    polls: usize,
}

/// Deployment service replaying a scripted sequence of deployment snapshots.
///
/// Each poll takes the next snapshot; the last one repeats forever.
#[derive(Debug, Clone, Default)]
pub struct FakeService {
    state: Arc<Mutex<ServiceState>>,
}

impl FakeService {
    pub fn with_snapshots(snapshots: impl IntoIterator<Item = DeploymentInfo>) -> Self {
        let service = Self::default();
        service.state.lock().snapshots = snapshots.into_iter().collect();
        service
    }

    pub fn fail_register(self, err: RemoteError) -> Self {
        self.state.lock().register_error = Some(err);
        self
    }

    pub fn fail_create(self, err: RemoteError) -> Self {
        self.state.lock().create_error = Some(err);
        self
    }

    pub fn fail_get(self, err: RemoteError) -> Self {
        self.state.lock().get_error = Some(err);
        self
    }

    pub fn registered(&self) -> Vec<RegisterRevisionRequest> {
        self.state.lock().registered.clone()
    }

    pub fn created(&self) -> Vec<CreateDeploymentRequest> {
        self.state.lock().created.clone()
    }

    pub fn polls(&self) -> usize {
        self.state.lock().polls
    }
}

#[async_trait]
impl DeployService for FakeService {
    async fn register_application_revision(
        &self,
        request: &RegisterRevisionRequest,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        if let Some(err) = state.register_error.take() {
            return Err(err);
        }
        state.registered.push(request.clone());
        Ok(())
    }

    async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<DeploymentId, RemoteError> {
        let mut state = self.state.lock();
        if let Some(err) = state.create_error.take() {
            return Err(err);
        }
        state.created.push(request.clone());
        Ok(DeploymentId::new("d-TEST123"))
    }

    async fn get_deployment(&self, id: &DeploymentId) -> Result<DeploymentInfo, RemoteError> {
        let mut state = self.state.lock();
        state.polls += 1;
        if let Some(err) = state.get_error.take() {
            return Err(err);
        }
        let snapshot = if state.snapshots.len() > 1 {
            state.snapshots.pop_front()
        } else {
            state.snapshots.front().cloned()
        };
        snapshot
            .map(|mut info| {
                info.id = id.clone();
                info
            })
            .ok_or_else(|| RemoteError::Unexpected("no scripted deployment".to_string()))
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn running(pending: u32, in_progress: u32) -> DeploymentInfo {
    DeploymentInfo {
        id: DeploymentId::new("d-TEST123"),
        status: DeploymentStatus::InProgress,
        instance_counts: InstanceCounts {
            pending,
            in_progress,
            ..Default::default()
        },
        error_info: None,
        start_time: Some(start_time()),
        complete_time: None,
    }
}

pub fn finished(status: DeploymentStatus, counts: InstanceCounts) -> DeploymentInfo {
    DeploymentInfo {
        id: DeploymentId::new("d-TEST123"),
        status,
        instance_counts: counts,
        error_info: (status != DeploymentStatus::Succeeded).then(|| ErrorInfo {
            code: Some("HEALTH_CONSTRAINTS".to_string()),
            message: Some("too many failed instances".to_string()),
        }),
        start_time: Some(start_time()),
        complete_time: Some(start_time() + chrono::Duration::minutes(2)),
    }
}

// Clock

#[derive(Debug)]
struct ClockState {
    now: DateTime<Utc>,
    sleeps: Vec<Duration>,
    interrupt_on: Option<usize>,
}

/// Clock that advances by the requested duration on every sleep, without waiting.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ClockState>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                now,
                sleeps: Vec::new(),
                interrupt_on: None,
            })),
        }
    }

    /// Fail the `n`th sleep (1-based) with an interruption.
    pub fn interrupt_on(self, n: usize) -> Self {
        self.state.lock().interrupt_on = Some(n);
        self
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.state.lock().now
    }

    async fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        let mut state = self.state.lock();
        state.sleeps.push(duration);
        if state.interrupt_on == Some(state.sleeps.len()) {
            return Err(Interrupted("sleep cancelled".to_string()));
        }
        state.now += chrono::Duration::from_std(duration).unwrap();
        Ok(())
    }
}

// Listener

/// Lifecycle events as seen by a listener, with just enough detail to assert on.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Info(String),
    UploadStarted { archive: PathBuf, bucket: String, key: String },
    UploadFinished(UploadedRevision),
    RegisterStarted(String),
    RegisterFinished(RevisionLocation),
    DeployStarted(String),
    DeployFinished(String),
    WaitStarted(String),
    InProgress(InstanceCounts),
    Failed {
        status: DeploymentStatus,
        timeout: Option<Duration>,
        error: Option<ErrorInfo>,
        counts: InstanceCounts,
    },
    Succeeded(InstanceCounts),
    Exception(Problem),
}

/// Listener that records every event in order.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn exceptions(&self) -> Vec<Problem> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Exception(problem) => Some(problem),
                _ => None,
            })
            .collect()
    }

    /// Event names only, for asserting on sequences.
    pub fn names(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .map(|event| match event {
                Event::Info(_) => "info",
                Event::UploadStarted { .. } => "upload_started",
                Event::UploadFinished(_) => "upload_finished",
                Event::RegisterStarted(_) => "register_started",
                Event::RegisterFinished(_) => "register_finished",
                Event::DeployStarted(_) => "deploy_started",
                Event::DeployFinished(_) => "deploy_finished",
                Event::WaitStarted(_) => "wait_started",
                Event::InProgress(_) => "in_progress",
                Event::Failed { .. } => "failed",
                Event::Succeeded(_) => "succeeded",
                Event::Exception(_) => "exception",
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl PackagingLogger for RecordingListener {
    fn info(&self, message: &str) {
        self.push(Event::Info(message.to_string()));
    }
}

impl DeploymentListener for RecordingListener {
    fn upload_started(&self, archive: &Path, bucket: &str, key: &str) {
        self.push(Event::UploadStarted {
            archive: archive.to_path_buf(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
    }

    fn upload_finished(&self, upload: &UploadedRevision) {
        self.push(Event::UploadFinished(upload.clone()));
    }

    fn register_started(&self, application: &str, _location: &RevisionLocation) {
        self.push(Event::RegisterStarted(application.to_string()));
    }

    fn register_finished(&self, _application: &str, location: &RevisionLocation) {
        self.push(Event::RegisterFinished(location.clone()));
    }

    fn deploy_started(&self, options: &DeploymentOptions, _location: &RevisionLocation) {
        self.push(Event::DeployStarted(options.deployment_group.clone()));
    }

    fn deploy_finished(&self, _options: &DeploymentOptions, id: &DeploymentId) {
        self.push(Event::DeployFinished(id.to_string()));
    }

    fn wait_started(&self, id: &DeploymentId) {
        self.push(Event::WaitStarted(id.to_string()));
    }

    fn in_progress(&self, _id: &DeploymentId, counts: &InstanceCounts) {
        self.push(Event::InProgress(*counts));
    }

    fn failed(
        &self,
        _id: &DeploymentId,
        status: DeploymentStatus,
        timeout: Option<Duration>,
        error: Option<&ErrorInfo>,
        counts: &InstanceCounts,
    ) {
        self.push(Event::Failed {
            status,
            timeout,
            error: error.cloned(),
            counts: *counts,
        });
    }

    fn succeeded(&self, _id: &DeploymentId, counts: &InstanceCounts) {
        self.push(Event::Succeeded(*counts));
    }

    fn exception(&self, problem: &Problem) {
        self.push(Event::Exception(problem.clone()));
    }
}
