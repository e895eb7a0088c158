//! Archive errors

use std::path::Path;

use super::BundleError;

/// Creates an archive write failure
pub fn write_failed(path: &Path, reason: impl ToString) -> BundleError {
    BundleError::ArchiveWriteFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
