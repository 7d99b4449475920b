// ABOUTME: Packaging error types with SNAFU context selectors.
// ABOUTME: Splits configuration problems from I/O failures for programmatic handling.

use snafu::Snafu;
use std::path::{Path, PathBuf};

/// Errors raised while locating or building a revision archive.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PackagingError {
    #[snafu(display("invalid path pattern '{pattern}': {source}"))]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },

    #[snafu(display("no files found in {} matching '{rules}'", base_dir.display()))]
    NoFilesFound { base_dir: PathBuf, rules: String },

    #[snafu(display(
        "appspec.yml not found in {} and no custom appspec was provided",
        base_dir.display()
    ))]
    MissingSpec { base_dir: PathBuf },

    #[snafu(display("custom appspec file not found: {}", path.display()))]
    CustomSpecNotFound { path: PathBuf },

    #[snafu(display("revision archive not found: {}", path.display()))]
    ArchiveNotFound { path: PathBuf },

    #[snafu(display("{} is outside base directory {}", path.display(), base_dir.display()))]
    OutsideBaseDir { path: PathBuf, base_dir: PathBuf },

    #[snafu(display(
        "{} and {} both map to archive entry '{zip_path}'",
        first.display(),
        path.display()
    ))]
    DuplicateEntry {
        zip_path: String,
        first: PathBuf,
        path: PathBuf,
    },

    #[snafu(display("failed to scan {}: {source}", path.display()))]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[snafu(display("failed to package {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to write archive {}: {source}", path.display()))]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagingErrorKind {
    /// The rules, inputs or spec file setup cannot produce an archive.
    Configuration,
    /// Reading a source file or writing the archive failed.
    Packaging,
}

impl PackagingError {
    pub fn kind(&self) -> PackagingErrorKind {
        match self {
            PackagingError::InvalidPattern { .. }
            | PackagingError::NoFilesFound { .. }
            | PackagingError::MissingSpec { .. }
            | PackagingError::CustomSpecNotFound { .. }
            | PackagingError::ArchiveNotFound { .. }
            | PackagingError::OutsideBaseDir { .. }
            | PackagingError::DuplicateEntry { .. } => PackagingErrorKind::Configuration,
            PackagingError::Walk { .. } | PackagingError::Io { .. } | PackagingError::Zip { .. } => {
                PackagingErrorKind::Packaging
            }
        }
    }

    /// The file that caused the failure, if any. For a duplicate entry this is
    /// the second file mapped to the shared path.
    pub fn offending_file(&self) -> Option<&Path> {
        match self {
            PackagingError::DuplicateEntry { path, .. }
            | PackagingError::Walk { path, .. }
            | PackagingError::Io { path, .. }
            | PackagingError::Zip { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_kinds() {
        let err = PackagingError::MissingSpec {
            base_dir: PathBuf::from("/work"),
        };
        assert_eq!(err.kind(), PackagingErrorKind::Configuration);
        assert!(err.to_string().contains("appspec.yml"));
        assert!(err.offending_file().is_none());
    }

    #[test]
    fn io_failures_name_the_file() {
        let err = PackagingError::Io {
            path: PathBuf::from("/work/app.jar"),
            source: std::io::Error::other("disk on fire"),
        };
        assert_eq!(err.kind(), PackagingErrorKind::Packaging);
        assert_eq!(err.offending_file(), Some(Path::new("/work/app.jar")));
        assert!(err.to_string().contains("/work/app.jar"));
    }

    #[test]
    fn duplicate_entries_name_both_sources() {
        let err = PackagingError::DuplicateEntry {
            zip_path: "x/f.txt".to_string(),
            first: PathBuf::from("/work/a/f.txt"),
            path: PathBuf::from("/work/b/f.txt"),
        };
        assert_eq!(err.kind(), PackagingErrorKind::Configuration);
        assert_eq!(err.offending_file(), Some(Path::new("/work/b/f.txt")));
        let message = err.to_string();
        assert!(message.contains("/work/a/f.txt"));
        assert!(message.contains("x/f.txt"));
    }
}
