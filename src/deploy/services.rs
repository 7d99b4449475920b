// ABOUTME: Capability traits for the remote object store and deployment service.
// ABOUTME: Concrete clients are injected; credential and region setup happen elsewhere.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{BundleType, DeploymentId};

use super::failure::RemoteError;
use super::state::DeploymentInfo;

/// What the object store reports after storing an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectOutput {
    pub version_id: Option<String>,
    pub etag: Option<String>,
}

/// Object storage: upload an archive and describe where it lives.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a local file under `bucket/key`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        file: &Path,
    ) -> Result<PutObjectOutput, RemoteError>;

    /// Region the store is bound to, if any.
    fn region(&self) -> Option<&str> {
        None
    }

    /// Direct URL of a stored object.
    fn object_url(&self, bucket: &str, key: &str) -> String {
        virtual_hosted_url(bucket, key, self.region())
    }
}

/// Deployment service: revisions, deployments, and deployment status.
#[async_trait]
pub trait DeployService: Send + Sync {
    async fn register_application_revision(
        &self,
        request: &RegisterRevisionRequest,
    ) -> Result<(), RemoteError>;

    async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<DeploymentId, RemoteError>;

    async fn get_deployment(&self, id: &DeploymentId) -> Result<DeploymentInfo, RemoteError>;
}

/// A stored revision archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionLocation {
    pub bucket: String,
    pub key: String,
    pub bundle_type: BundleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedRevision {
    pub bucket: String,
    pub key: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl UploadedRevision {
    /// Location of this upload for registering or deploying it.
    pub fn location(&self, bundle_type: BundleType) -> RevisionLocation {
        RevisionLocation {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
            bundle_type,
            version: self.version.clone(),
            etag: self.etag.clone(),
        }
    }
}

/// How the deployment agent treats files already present on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileExistsBehavior {
    Disallow,
    Overwrite,
    Retain,
}

/// Where and how a revision gets deployed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeploymentOptions {
    pub application: String,
    pub deployment_group: String,
    pub deployment_config: Option<String>,
    pub file_exists_behavior: Option<FileExistsBehavior>,
    pub rollback_on_failure: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRevisionRequest {
    pub application: String,
    pub location: RevisionLocation,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDeploymentRequest {
    pub application: String,
    pub deployment_group: String,
    pub location: RevisionLocation,
    pub deployment_config: Option<String>,
    pub file_exists_behavior: Option<FileExistsBehavior>,
    pub rollback_on_failure: bool,
    pub description: String,
}

/// Virtual-hosted style object URL with each key segment percent-encoded.
pub fn virtual_hosted_url(bucket: &str, key: &str, region: Option<&str>) -> String {
    let encoded_key = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    match region {
        Some(region) if region != "us-east-1" => {
            format!("https://{bucket}.s3.{region}.amazonaws.com/{encoded_key}")
        }
        _ => format!("https://{bucket}.s3.amazonaws.com/{encoded_key}"),
    }
}
