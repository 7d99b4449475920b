// ABOUTME: Remote deployment lifecycle: upload, register, deploy, and wait.
// ABOUTME: Exports the client, collaborator traits, and deployment records.

mod client;
mod clock;
mod description;
mod failure;
mod services;
mod state;

pub use client::{DeploymentClient, WaitOutcome, WaitSettings};
pub use clock::{Clock, Interrupted, SystemClock};
pub use description::{
    DEPLOY_PREFIX, MAX_DESCRIPTION_LENGTH, REGISTER_PREFIX, describe, truncate_middle,
};
pub use failure::{Problem, ProblemType, RemoteError};
pub use services::{
    CreateDeploymentRequest, DeployService, DeploymentOptions, FileExistsBehavior, ObjectStore,
    PutObjectOutput, RegisterRevisionRequest, RevisionLocation, UploadedRevision,
    virtual_hosted_url,
};
pub use state::{DeploymentInfo, DeploymentStatus, ErrorInfo, InstanceCounts};
