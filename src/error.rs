// ABOUTME: Application-wide error types for revdeploy.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::revision::PackagingError;
use crate::types::{BundleTypeError, RegionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Packaging(#[from] PackagingError),

    #[error(transparent)]
    BundleType(#[from] BundleTypeError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether the error comes from user-supplied settings rather than the environment.
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::Packaging(e) => {
                e.kind() == crate::revision::PackagingErrorKind::Configuration
            }
            Error::InvalidConfig(_) | Error::BundleType(_) | Error::Region(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
