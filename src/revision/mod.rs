// ABOUTME: Application revision packaging.
// ABOUTME: Mapping rules, the path resolver, and the archive builder.

mod archive;
mod error;
mod mapping;
mod rules;

pub use archive::{ArchiveBuilder, ArchiveEntry, RevisionSpec};
pub use error::{PackagingError, PackagingErrorKind};
pub use mapping::PathMappingResolver;
pub use rules::{MappingRule, RuleKind, RuleSet, SPEC_FILE_NAME, normalize_path};
