//! Build request errors

use super::BundleError;

/// Creates an invalid identifier error
pub fn invalid_identifier(
    field: impl Into<String>,
    value: impl Into<String>,
    reason: impl Into<String>,
) -> BundleError {
    BundleError::InvalidIdentifier {
        field: field.into(),
        value: value.into(),
        reason: reason.into(),
    }
}

/// Creates a target busy error
pub fn target_busy(target: impl Into<String>) -> BundleError {
    BundleError::TargetBusy {
        target: target.into(),
    }
}
