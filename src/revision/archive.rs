// ABOUTME: Builds the revision archive from mapped files and the appspec.yml spec file.
// ABOUTME: Short-circuits to a pre-built archive when the rules name exactly one.

use chrono::{Datelike, Local, Timelike};
use snafu::{ResultExt, ensure};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime as ZipDateTime, ZipWriter};

use crate::listener::PackagingLogger;
use crate::types::BundleType;

use super::error::{
    ArchiveNotFoundSnafu, CustomSpecNotFoundSnafu, DuplicateEntrySnafu, IoSnafu, MissingSpecSnafu,
    NoFilesFoundSnafu, OutsideBaseDirSnafu, PackagingError, ZipSnafu,
};
use super::mapping::{PathMappingResolver, resolve_against};
use super::rules::{RuleSet, SPEC_FILE_NAME};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Inputs for one archive build.
#[derive(Debug, Clone)]
pub struct RevisionSpec {
    /// Archive name; `.zip` is appended unless already present.
    pub name: String,
    /// Raw mapping rule text.
    pub rules: String,
    pub base_dir: PathBuf,
    pub temp_dir: PathBuf,
    /// Custom spec override: a path ending in `appspec.yml`, or literal content.
    pub custom_spec: Option<String>,
}

/// One file scheduled for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub source: PathBuf,
    pub zip_path: String,
    pub modified: SystemTime,
}

/// Packages files into a revision archive.
pub struct ArchiveBuilder {
    spec: RevisionSpec,
    logger: Option<Arc<dyn PackagingLogger>>,
}

impl std::fmt::Debug for ArchiveBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveBuilder")
            .field("spec", &self.spec)
            .finish()
    }
}

impl ArchiveBuilder {
    pub fn new(spec: RevisionSpec) -> Self {
        Self { spec, logger: None }
    }

    pub fn with_logger(mut self, logger: Arc<dyn PackagingLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn spec(&self) -> &RevisionSpec {
        &self.spec
    }

    /// Locate or build the revision archive.
    ///
    /// # Errors
    ///
    /// Configuration errors when nothing matches or no spec file is available;
    /// packaging failures naming the offending file on I/O errors. A partially
    /// written archive is left in place.
    pub fn build(&self) -> Result<PathBuf, PackagingError> {
        let rules = RuleSet::parse(&self.spec.rules);

        if let Some(path) = rules.single_path()
            && BundleType::detect(path).is_some()
        {
            let archive = resolve_against(&self.spec.base_dir, path);
            ensure!(archive.is_file(), ArchiveNotFoundSnafu { path: archive });
            tracing::info!("using pre-built revision archive {}", archive.display());
            return Ok(archive);
        }

        let resolver = PathMappingResolver::new(&self.spec.base_dir, &rules)?;
        let mut files = resolver.collect_files()?;
        ensure!(
            !files.is_empty(),
            NoFilesFoundSnafu {
                base_dir: &self.spec.base_dir,
                rules: self.spec.rules.trim(),
            }
        );

        let bundled_spec = files
            .iter()
            .find(|file| is_spec_slot(&resolver, file))
            .cloned();
        let custom_spec = self.resolve_custom_spec()?;

        match (&custom_spec, bundled_spec) {
            (Some(custom), Some(bundled)) => {
                files.retain(|file| !is_spec_slot(&resolver, file));
                self.log(&format!(
                    "will replace {} with custom {SPEC_FILE_NAME} {}",
                    bundled.display(),
                    custom.display()
                ));
                files.insert(custom.clone());
            }
            (Some(custom), None) => {
                self.log(&format!(
                    "will use custom {SPEC_FILE_NAME} {}",
                    custom.display()
                ));
                files.insert(custom.clone());
            }
            (None, Some(_)) => {}
            (None, None) => {
                return MissingSpecSnafu {
                    base_dir: &self.spec.base_dir,
                }
                .fail();
            }
        }

        let entries = self.entries(&resolver, &files, custom_spec.as_deref())?;
        let archive = self.archive_path();
        self.log(&format!(
            "packaging {} files to {}",
            entries.len(),
            archive.display()
        ));
        write_archive(&archive, &entries)?;

        Ok(archive)
    }

    /// Where the archive is written: `temp_dir/<name>.zip`.
    pub fn archive_path(&self) -> PathBuf {
        let name = &self.spec.name;
        if name.to_ascii_lowercase().ends_with(".zip") {
            self.spec.temp_dir.join(name)
        } else {
            self.spec.temp_dir.join(format!("{name}.zip"))
        }
    }

    fn resolve_custom_spec(&self) -> Result<Option<PathBuf>, PackagingError> {
        let Some(custom) = self.spec.custom_spec.as_deref() else {
            return Ok(None);
        };
        let trimmed = custom.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        if trimmed.ends_with(SPEC_FILE_NAME) {
            let path = resolve_against(&self.spec.base_dir, trimmed);
            ensure!(path.is_file(), CustomSpecNotFoundSnafu { path });
            return Ok(Some(path));
        }

        // A file left by an earlier build is reused only if it holds the same content.
        let path = self.spec.temp_dir.join(SPEC_FILE_NAME);
        if fs::read_to_string(&path).ok().as_deref() != Some(custom) {
            fs::create_dir_all(&self.spec.temp_dir).context(IoSnafu {
                path: &self.spec.temp_dir,
            })?;
            fs::write(&path, custom).context(IoSnafu { path: &path })?;
        }
        Ok(Some(path))
    }

    fn entries(
        &self,
        resolver: &PathMappingResolver,
        files: &BTreeSet<PathBuf>,
        custom_spec: Option<&Path>,
    ) -> Result<Vec<ArchiveEntry>, PackagingError> {
        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            let zip_path = if Some(file.as_path()) == custom_spec {
                SPEC_FILE_NAME.to_string()
            } else {
                resolver.map_path(file).ok_or_else(|| {
                    OutsideBaseDirSnafu {
                        path: file,
                        base_dir: resolver.base_dir(),
                    }
                    .build()
                })?
            };
            let modified = fs::metadata(file)
                .and_then(|meta| meta.modified())
                .context(IoSnafu { path: file })?;
            entries.push(ArchiveEntry {
                source: file.clone(),
                zip_path,
                modified,
            });
        }
        entries.sort_by(|a, b| a.zip_path.cmp(&b.zip_path));
        if let Some(pair) = entries
            .windows(2)
            .find(|pair| pair[0].zip_path == pair[1].zip_path)
        {
            return DuplicateEntrySnafu {
                zip_path: &pair[1].zip_path,
                first: &pair[0].source,
                path: &pair[1].source,
            }
            .fail();
        }
        Ok(entries)
    }

    fn log(&self, message: &str) {
        tracing::info!("{message}");
        if let Some(logger) = &self.logger {
            logger.info(message);
        }
    }
}

fn is_spec_slot(resolver: &PathMappingResolver, file: &Path) -> bool {
    resolver.map_path(file).as_deref() == Some(SPEC_FILE_NAME)
}

/// Write entries into a zip file, streaming each source through a fixed buffer.
fn write_archive(archive: &Path, entries: &[ArchiveEntry]) -> Result<(), PackagingError> {
    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent).context(IoSnafu { path: parent })?;
    }

    let file = File::create(archive).context(IoSnafu { path: archive })?;
    let mut zip = ZipWriter::new(file);
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];

    for entry in entries {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip_timestamp(entry.modified));
        zip.start_file(entry.zip_path.as_str(), options)
            .context(ZipSnafu { path: archive })?;

        let mut source = File::open(&entry.source).context(IoSnafu {
            path: &entry.source,
        })?;
        loop {
            let read = match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(e).context(IoSnafu {
                        path: &entry.source,
                    });
                }
            };
            zip.write_all(&buffer[..read])
                .context(IoSnafu { path: archive })?;
        }
    }

    zip.finish().context(ZipSnafu { path: archive })?;
    Ok(())
}

/// Zip timestamps are local DOS times; anything before 1980 falls back to the epoch default.
fn zip_timestamp(modified: SystemTime) -> ZipDateTime {
    let local: chrono::DateTime<Local> = modified.into();
    let Ok(year) = u16::try_from(local.year()) else {
        return ZipDateTime::default();
    };
    ZipDateTime::from_date_and_time(
        year,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> RevisionSpec {
        RevisionSpec {
            name: name.to_string(),
            rules: String::new(),
            base_dir: PathBuf::from("/work"),
            temp_dir: PathBuf::from("/tmp/out"),
            custom_spec: None,
        }
    }

    #[test]
    fn archive_name_gets_zip_extension() {
        let builder = ArchiveBuilder::new(spec("my-app"));
        assert_eq!(builder.archive_path(), PathBuf::from("/tmp/out/my-app.zip"));
    }

    #[test]
    fn archive_name_keeps_existing_zip_extension() {
        let builder = ArchiveBuilder::new(spec("my-app.zip"));
        assert_eq!(builder.archive_path(), PathBuf::from("/tmp/out/my-app.zip"));
    }

    #[test]
    fn pre_1980_timestamps_fall_back_to_default() {
        assert_eq!(zip_timestamp(SystemTime::UNIX_EPOCH), ZipDateTime::default());
    }
}
