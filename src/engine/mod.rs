//! Rename and fan-out engine
//!
//! Copies the fixed catalog of source files into a target directory under names
//! derived from a requester-supplied token. Files of the `polygon_resource` class
//! are replicated into one subfolder per category label.
//!
//! Missing source files and existing destinations are skipped and reported, never
//! treated as errors. Directory creation and copy failures abort the request.

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::Result;
use crate::error::fs::{copy_failed, create_dir_failed};

/// What happened to one planned copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// File copied to `destination`
    Copied {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Catalog entry absent from the source directory
    SourceMissing { source: PathBuf },
    /// Destination already present; the copy was skipped
    DestinationExists { destination: PathBuf },
}

impl CopyOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self, CopyOutcome::Copied { .. })
    }
}

/// Per-file outcomes of one engine run, in processing order
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    pub outcomes: Vec<CopyOutcome>,
}

impl CopyReport {
    pub fn copied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_copied()).count()
    }

    pub fn missing(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CopyOutcome::SourceMissing { .. }))
            .count()
    }

    pub fn skipped_existing(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CopyOutcome::DestinationExists { .. }))
            .count()
    }
}

/// One destination computed for a catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    /// Category subfolder that must exist before copying, if any
    pub folder: Option<PathBuf>,
    pub destination: PathBuf,
}

/// Copies and renames catalog files out of one configured source directory
#[derive(Debug, Clone)]
pub struct CopyEngine {
    source_dir: PathBuf,
    catalog: Catalog,
}

impl CopyEngine {
    pub fn new(source_dir: impl Into<PathBuf>, catalog: Catalog) -> Self {
        Self {
            source_dir: source_dir.into(),
            catalog,
        }
    }

    /// Copy every catalog entry present in the source directory into `target_dir`
    ///
    /// `target_dir` is created with its parents when absent. Entries are processed
    /// in catalog order and independently of each other.
    pub fn copy_and_rename(&self, target_dir: &Path, name_token: &str) -> Result<CopyReport> {
        ensure_dir(target_dir)?;

        let mut report = CopyReport::default();
        for entry in self.catalog.entries() {
            let source = self.source_dir.join(&entry.file_name);
            if !source.is_file() {
                warn!(
                    target: "shpbundle::engine",
                    file = %entry.file_name,
                    "Source file missing, skipping copy"
                );
                report.outcomes.push(CopyOutcome::SourceMissing { source });
                continue;
            }

            let categories = self.catalog.categories();
            for planned in plan_destinations(entry, target_dir, name_token, categories) {
                if let Some(folder) = &planned.folder {
                    ensure_dir(folder)?;
                }
                report
                    .outcomes
                    .push(copy_if_absent(&source, &planned.destination, entry)?);
            }
        }

        Ok(report)
    }
}

/// Compute destination paths for one catalog entry
pub fn plan_destinations(
    entry: &CatalogEntry,
    target_dir: &Path,
    name_token: &str,
    categories: &[String],
) -> Vec<PlannedCopy> {
    let ext = entry.extension();
    match (entry.class, entry.marker.as_deref()) {
        (Some(class), Some(marker)) if class.fans_out() => categories
            .iter()
            .map(|label| {
                let folder = target_dir.join(label);
                PlannedCopy {
                    destination: folder.join(format!("{name_token}_{label}_{marker}.{ext}")),
                    folder: Some(folder),
                }
            })
            .collect(),
        (Some(_), Some(marker)) => vec![PlannedCopy {
            folder: None,
            destination: target_dir.join(format!("{name_token}_{marker}.{ext}")),
        }],
        _ => vec![PlannedCopy {
            folder: None,
            destination: target_dir.join(format!("{name_token}_{}", entry.file_name)),
        }],
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|e| create_dir_failed(path, &e))?;
    }
    Ok(())
}

fn copy_if_absent(source: &Path, destination: &Path, entry: &CatalogEntry) -> Result<CopyOutcome> {
    let display_name = file_name_of(destination);

    let copied = if destination.exists() {
        false
    } else {
        copy_new_file(source, destination).map_err(|e| copy_failed(source, destination, &e))?
    };

    if !copied {
        warn!(
            target: "shpbundle::engine",
            destination = %display_name,
            "Destination exists, skipping copy"
        );
        return Ok(CopyOutcome::DestinationExists {
            destination: destination.to_path_buf(),
        });
    }

    info!(
        target: "shpbundle::engine",
        source = %entry.file_name,
        destination = %display_name,
        "Copied and renamed"
    );
    Ok(CopyOutcome::Copied {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
    })
}

/// Copy content, modification time and permissions into a file that must not exist yet
///
/// The copy is staged in a temporary file next to `destination` and linked into
/// place only once complete, so a failed copy never leaves a partial destination.
/// Returns `Ok(false)` when the destination appeared after the existence check.
fn copy_new_file(source: &Path, destination: &Path) -> std::io::Result<bool> {
    let mut reader = File::open(source)?;
    let metadata = reader.metadata()?;
    let dir = destination.parent().unwrap_or_else(|| Path::new("."));

    let mut staging = tempfile::Builder::new()
        .prefix(".shpbundle-copy-")
        .tempfile_in(dir)?;
    io::copy(&mut reader, staging.as_file_mut())?;
    staging.as_file().set_modified(metadata.modified()?)?;
    staging.as_file().set_permissions(metadata.permissions())?;

    match staging.persist_noclobber(destination) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
