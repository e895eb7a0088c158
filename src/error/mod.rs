//! Error types and handling for shpbundle
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`request`]: Build request validation and target locking
//! - [`fs`]: File system errors raised while copying
//! - [`archive`]: Archive writing errors
//! - [`records`]: Record log errors
//! - [`config`]: Settings and catalog errors
//!
//! Per-file conditions (a missing source file, an existing destination) are not errors;
//! the engine reports them as [`crate::engine::CopyOutcome`] values instead.

pub mod archive;
pub mod config;
pub mod fs;
pub mod records;
pub mod request;


use miette::Diagnostic;
use thiserror::Error;

/// Main error type for shpbundle operations
#[derive(Error, Diagnostic, Debug)]
pub enum BundleError {
    // Request errors
    #[error("Invalid {field} '{value}': {reason}")]
    #[diagnostic(
        code(shpbundle::request::invalid_identifier),
        help("Identifiers are used as path segments and must not contain '/', '\\' or be '.' or '..'")
    )]
    InvalidIdentifier {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Target '{target}' is already being built by another request")]
    #[diagnostic(
        code(shpbundle::request::target_busy),
        help("Wait for the running build to finish and retry")
    )]
    TargetBusy { target: String },

    // File system errors
    #[error("Failed to create directory: {path}: {reason}")]
    #[diagnostic(code(shpbundle::fs::create_dir_failed))]
    DirectoryCreateFailed { path: String, reason: String },

    #[error("Failed to copy '{source_path}' to '{destination}': {reason}")]
    #[diagnostic(code(shpbundle::fs::copy_failed))]
    CopyFailed {
        source_path: String,
        destination: String,
        reason: String,
    },

    #[error("IO error: {message}")]
    #[diagnostic(code(shpbundle::fs::io_error))]
    IoError { message: String },

    // Archive errors
    #[error("Failed to write archive: {path}: {reason}")]
    #[diagnostic(code(shpbundle::archive::write_failed))]
    ArchiveWriteFailed { path: String, reason: String },

    // Record log errors
    #[error("Failed to write record log: {path}: {reason}")]
    #[diagnostic(
        code(shpbundle::records::write_failed),
        help("The bundle was built but its download was not recorded")
    )]
    RecordLogWriteFailed { path: String, reason: String },

    #[error("Failed to read record log: {path}: {reason}")]
    #[diagnostic(code(shpbundle::records::read_failed))]
    RecordLogReadFailed { path: String, reason: String },

    // Configuration errors
    #[error("Source directory is not configured")]
    #[diagnostic(
        code(shpbundle::config::source_dir_missing),
        help(
            "Pass --source-dir, set SHPBUNDLE_SOURCE_DIR, or add 'source_dir' to shpbundle.yaml"
        )
    )]
    SourceDirNotConfigured,

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(shpbundle::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(shpbundle::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid file catalog: {message}")]
    #[diagnostic(code(shpbundle::config::catalog_invalid))]
    CatalogInvalid { message: String },

    // CLI errors
    #[error("Unknown shell: {shell}")]
    #[diagnostic(
        code(shpbundle::cli::unknown_shell),
        help("Supported shells: bash, elvish, fish, powershell, zsh")
    )]
    UnknownShell { shell: String },
}

impl From<std::io::Error> for BundleError {
    fn from(err: std::io::Error) -> Self {
        BundleError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for BundleError {
    fn from(err: serde_yaml::Error) -> Self {
        BundleError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BundleError {
    fn from(err: serde_json::Error) -> Self {
        BundleError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for BundleError {
    fn from(err: zip::result::ZipError) -> Self {
        BundleError::ArchiveWriteFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<walkdir::Error> for BundleError {
    fn from(err: walkdir::Error) -> Self {
        BundleError::ArchiveWriteFailed {
            path: err
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            reason: err.to_string(),
        }
    }
}

impl From<csv::Error> for BundleError {
    fn from(err: csv::Error) -> Self {
        BundleError::RecordLogReadFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, BundleError>;
