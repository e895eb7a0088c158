//! File system errors

use std::path::Path;

use super::BundleError;

/// Creates a directory creation failure
pub fn create_dir_failed(path: &Path, e: &std::io::Error) -> BundleError {
    BundleError::DirectoryCreateFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Creates a copy failure
pub fn copy_failed(source: &Path, destination: &Path, e: &std::io::Error) -> BundleError {
    BundleError::CopyFailed {
        source_path: source.display().to_string(),
        destination: destination.display().to_string(),
        reason: e.to_string(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> BundleError {
    BundleError::IoError {
        message: message.into(),
    }
}
