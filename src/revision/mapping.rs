// ABOUTME: Resolves where each source file lands inside a revision archive.
// ABOUTME: Collects files matching ordered rules and maps them to archive paths.

use globset::{GlobBuilder, GlobMatcher};
use snafu::ResultExt;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::error::{InvalidPatternSnafu, PackagingError, WalkSnafu};
use super::rules::{MappingRule, RuleSet};

/// A rule paired with its compiled glob (only for wildcard patterns).
#[derive(Debug)]
struct CompiledRule {
    rule: MappingRule,
    matcher: Option<GlobMatcher>,
}

impl CompiledRule {
    fn compile(rule: &MappingRule) -> Result<Self, PackagingError> {
        let matcher = if rule.has_wildcard() {
            let pattern = rule.glob_pattern();
            let glob = GlobBuilder::new(&pattern)
                .literal_separator(true)
                .backslash_escape(false)
                .build()
                .context(InvalidPatternSnafu {
                    pattern: rule.pattern(),
                })?;
            Some(glob.compile_matcher())
        } else {
            None
        };
        Ok(Self {
            rule: rule.clone(),
            matcher,
        })
    }

    fn is_match(&self, relative: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(relative),
            None => {
                relative == self.rule.pattern()
                    || strip_path_prefix(relative, self.rule.pattern()).is_some()
            }
        }
    }
}

/// Decides the archive path of files under a base directory.
#[derive(Debug)]
pub struct PathMappingResolver {
    base_dir: PathBuf,
    includes: Vec<CompiledRule>,
    excludes: Vec<CompiledRule>,
}

impl PathMappingResolver {
    /// Compile the rule set against a base directory.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::InvalidPattern` if a wildcard pattern is not a valid glob.
    pub fn new(base_dir: impl Into<PathBuf>, rules: &RuleSet) -> Result<Self, PackagingError> {
        let includes = rules
            .includes()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let excludes = rules
            .excludes()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base_dir: base_dir.into(),
            includes,
            excludes,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Collect every file selected by the rules.
    ///
    /// With no include rules, every file under the base directory is selected.
    /// Symlinked directories are not followed.
    pub fn collect_files(&self) -> Result<BTreeSet<PathBuf>, PackagingError> {
        let mut files = BTreeSet::new();

        if self.includes.is_empty() {
            files.extend(walk_files(&self.base_dir)?);
        } else {
            // Wildcard rules share one scan of the base directory.
            let mut scanned: Option<Vec<(PathBuf, String)>> = None;

            for compiled in &self.includes {
                if compiled.matcher.is_some() {
                    if scanned.is_none() {
                        scanned = Some(self.scan_base_dir()?);
                    }
                    let candidates = scanned.as_deref().unwrap_or_default();
                    files.extend(
                        candidates
                            .iter()
                            .filter(|(_, relative)| compiled.is_match(relative))
                            .map(|(path, _)| path.clone()),
                    );
                    continue;
                }

                let path = resolve_against(&self.base_dir, compiled.rule.pattern());
                if path.is_file() {
                    files.insert(path);
                } else if path.is_dir() {
                    files.extend(walk_files(&path)?);
                } else {
                    tracing::debug!("rule '{}' matched nothing", compiled.rule.pattern());
                }
            }
        }

        if !self.excludes.is_empty() {
            files.retain(|file| {
                let Some(relative) = self.relative_path(file) else {
                    return true;
                };
                !self.excludes.iter().any(|rule| rule.is_match(&relative))
            });
        }

        tracing::debug!(
            "collected {} file(s) under {}",
            files.len(),
            self.base_dir.display()
        );
        Ok(files)
    }

    /// Compute the archive path for a file.
    ///
    /// Rules are scanned in declared order. An exact pattern match returns
    /// `destination/filename` immediately. Prefix and wildcard matches only
    /// record a candidate and the scan continues, so the last matching rule
    /// decides. Files matched by no rule keep their relative path.
    ///
    /// Returns `None` if the file is not under the base directory.
    pub fn map_path(&self, file: &Path) -> Option<String> {
        let relative = self.relative_path(file)?;
        let mut mapped = None;

        for compiled in &self.includes {
            let rule = &compiled.rule;
            let pattern = rule.pattern();

            if pattern == relative {
                return Some(join(rule.destination(), file_name(&relative)));
            }

            if !rule.has_wildcard()
                && let Some(suffix) = strip_path_prefix(&relative, pattern)
            {
                mapped = Some(join(rule.destination(), suffix));
            } else if let Some(matcher) = &compiled.matcher
                && matcher.is_match(&relative)
            {
                let prefix = wildcard_prefix(pattern);
                let suffix = if prefix.is_empty() {
                    relative.as_str()
                } else {
                    strip_path_prefix(&relative, prefix).unwrap_or(relative.as_str())
                };
                mapped = Some(join(rule.destination(), suffix));
            }
        }

        Some(mapped.unwrap_or(relative))
    }

    /// Forward-slash path of `file` relative to the base directory.
    pub fn relative_path(&self, file: &Path) -> Option<String> {
        let relative = file.strip_prefix(&self.base_dir).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if parts.is_empty() {
            return None;
        }
        Some(parts.join("/"))
    }

    fn scan_base_dir(&self) -> Result<Vec<(PathBuf, String)>, PackagingError> {
        Ok(walk_files(&self.base_dir)?
            .into_iter()
            .filter_map(|path| {
                let relative = self.relative_path(&path)?;
                Some((path, relative))
            })
            .collect())
    }
}

/// Resolve a path against a base directory; absolute paths pass through.
pub(crate) fn resolve_against(base_dir: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base_dir.join(path.trim_end_matches('/'))
    }
}

fn walk_files(dir: &Path) -> Result<Vec<PathBuf>, PackagingError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.context(WalkSnafu { path: dir })?;
        let file_type = entry.file_type();
        // A symlink to a regular file is packaged; a symlink to a directory is not walked.
        if file_type.is_file() || (file_type.is_symlink() && entry.path().is_file()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Remainder of `path` below the directory `prefix`, if `prefix` is one of its parents.
fn strip_path_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return Some(path);
    }
    path.strip_prefix(prefix)?
        .strip_prefix('/')
        .filter(|rest| !rest.is_empty())
}

/// Directory part of a wildcard pattern that precedes its first wildcard segment.
///
/// `a/b/**/*.txt` gives `a/b`; `*.txt` gives an empty string.
fn wildcard_prefix(pattern: &str) -> &str {
    let mut prefix = pattern.trim_end_matches('/');
    while let Some(wildcard) = prefix.rfind(['*', '?']) {
        match prefix[..wildcard].rfind('/') {
            Some(slash) => prefix = &prefix[..slash],
            None => return "",
        }
    }
    prefix
}

fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

fn join(destination: &str, suffix: &str) -> String {
    if destination.is_empty() {
        suffix.to_string()
    } else {
        format!("{destination}/{suffix}")
    }
}
