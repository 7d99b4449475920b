// ABOUTME: Archive bundle type labels passed to the deployment service.
// ABOUTME: Derived purely from the file extension of an object key or archive name.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BundleTypeError {
    #[error("unsupported revision extension in '{0}' (expected .zip, .tar or .tar.gz)")]
    UnsupportedExtension(String),
}

/// Archive format label for a registered revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Zip,
    Tar,
    Tgz,
}

impl BundleType {
    /// Derive the bundle type from an object key or file name.
    ///
    /// `.tar.gz` is checked before `.tar` would be considered, and matching is
    /// case-insensitive.
    pub fn from_key(key: &str) -> Result<Self, BundleTypeError> {
        Self::detect(key).ok_or_else(|| BundleTypeError::UnsupportedExtension(key.to_string()))
    }

    /// Returns the bundle type if `name` ends with a recognised archive extension.
    pub fn detect(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".tar.gz") {
            Some(BundleType::Tgz)
        } else if lower.ends_with(".tar") {
            Some(BundleType::Tar)
        } else if lower.ends_with(".zip") {
            Some(BundleType::Zip)
        } else {
            None
        }
    }

    /// Label used by the deployment service.
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleType::Zip => "zip",
            BundleType::Tar => "tar",
            BundleType::Tgz => "tgz",
        }
    }
}

impl fmt::Display for BundleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
