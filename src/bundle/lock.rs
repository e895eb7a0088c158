//! Per-target build lock
//!
//! Only one build may run for a given target folder at a time, across threads
//! and processes. A second build fails fast instead of waiting.
//!
//! Lock files live in `{output_root}/.locks/`, apart from the target folders, so
//! no target name can collide with another target's lock file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::Result;
use crate::error::fs::{create_dir_failed, io_error};
use crate::error::request::target_busy;

/// Directory under the output root holding one lock file per target
pub const LOCK_DIR: &str = ".locks";

/// Exclusive lock held for the duration of one build
///
/// The lock is released when the value is dropped. Lock files are left in place:
/// removing them would let two builds lock different inodes for the same target.
#[derive(Debug)]
pub struct TargetLock {
    file: File,
    path: PathBuf,
}

impl TargetLock {
    /// Try to lock `target` inside `output_root`
    pub fn acquire(output_root: &Path, target: &str) -> Result<Self> {
        let dir = output_root.join(LOCK_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| create_dir_failed(&dir, &e))?;
        let path = dir.join(format!("{target}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| io_error(format!("failed to open lock file {}: {e}", path.display())))?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Err(target_busy(target));
            }
            return Err(io_error(format!("failed to lock {}: {e}", path.display())));
        }

        debug!(target: "shpbundle::bundle", lock = %path.display(), "Acquired target lock");
        Ok(Self { file, path })
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TargetLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!(target: "shpbundle::bundle", lock = %self.path.display(), "Released target lock");
    }
}
