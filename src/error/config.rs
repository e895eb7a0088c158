//! Configuration errors

use std::path::Path;

use super::BundleError;

/// Creates a configuration read error
pub fn read_failed(path: &Path, e: &std::io::Error) -> BundleError {
    BundleError::ConfigReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Creates a configuration parse error
pub fn parse_failed(path: &Path, reason: impl ToString) -> BundleError {
    BundleError::ConfigParseFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a catalog validation error
pub fn catalog_invalid(message: impl Into<String>) -> BundleError {
    BundleError::CatalogInvalid {
        message: message.into(),
    }
}
