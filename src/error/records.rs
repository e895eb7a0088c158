//! Record log errors

use std::path::Path;

use super::BundleError;

/// Creates a record log write failure
pub fn write_failed(path: &Path, reason: impl ToString) -> BundleError {
    BundleError::RecordLogWriteFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a record log read failure
pub fn read_failed(path: &Path, reason: impl ToString) -> BundleError {
    BundleError::RecordLogReadFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
