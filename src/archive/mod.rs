//! Archive builder
//!
//! Packs every regular file under a target directory into one deflate-compressed
//! zip placed in that same directory. Entry names are relative to the target
//! directory and always use `/` separators.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::error::archive::write_failed;

/// A file scheduled for inclusion in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub name: String,
}

/// List the regular files under `root` as archive entries, sorted by path
///
/// `exclude` is skipped so that an archive left by an earlier build of the same
/// directory is never packed into its replacement.
pub fn collect_entries(root: &Path, exclude: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.path() == exclude {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| write_failed(entry.path(), e))?;
        entries.push(ArchiveEntry {
            path: entry.path().to_path_buf(),
            name: entry_name(relative),
        });
    }
    Ok(entries)
}

/// Build `{target_dir}/{archive_name}` from every file under `target_dir`
///
/// The archive is written to a temporary file first and moved into place once
/// complete, so a failed build never leaves a truncated archive behind.
/// Returns the absolute path of the archive.
pub fn build_archive(target_dir: &Path, archive_name: &str) -> Result<PathBuf> {
    let archive_path = target_dir.join(archive_name);
    let entries = collect_entries(target_dir, &archive_path)?;

    let staging = tempfile::Builder::new()
        .prefix(".shpbundle-")
        .suffix(".zip.tmp")
        .tempfile_in(target_dir)
        .map_err(|e| write_failed(&archive_path, e))?;

    let mut writer = ZipWriter::new(staging.as_file());
    for entry in &entries {
        add_file(&mut writer, entry).map_err(|e| write_failed(&archive_path, e))?;
        debug!(target: "shpbundle::archive", entry = %entry.name, "Added archive entry");
    }
    writer
        .finish()
        .map_err(|e| write_failed(&archive_path, e))?;

    staging
        .persist(&archive_path)
        .map_err(|e| write_failed(&archive_path, e.error))?;

    let archive_path =
        dunce::canonicalize(&archive_path).map_err(|e| write_failed(&archive_path, e))?;
    info!(
        target: "shpbundle::archive",
        archive = %archive_path.display(),
        entries = entries.len(),
        "Created archive"
    );
    Ok(archive_path)
}

fn add_file<W: io::Write + io::Seek>(
    writer: &mut ZipWriter<W>,
    entry: &ArchiveEntry,
) -> zip::result::ZipResult<()> {
    let mut file = File::open(&entry.path)?;
    let size = file.metadata()?.len();
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(size >= u64::from(u32::MAX));

    writer.start_file(entry.name.as_str(), options)?;
    io::copy(&mut file, writer)?;
    Ok(())
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
