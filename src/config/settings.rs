//! Settings resolution
//!
//! Priority order (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. Global config from `~/.config/shpbundle/config.yaml` (if exists)
//! 3. Workspace `shpbundle.yaml` (if exists)
//! 4. Command line flags and `SHPBUNDLE_*` environment variables

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::config::{parse_failed, read_failed};
use crate::error::{BundleError, Result};

/// Workspace settings file name
pub const WORKSPACE_SETTINGS_FILE: &str = "shpbundle.yaml";

/// Environment variable overriding the global config directory
pub const CONFIG_DIR_ENV: &str = "SHPBUNDLE_CONFIG_DIR";

/// Contents of a settings file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub source_dir: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub record_dir: Option<PathBuf>,
    pub diagnostics_log: Option<PathBuf>,
}

impl SettingsFile {
    /// Parse a settings file from YAML
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load a settings file, resolving relative paths against its directory
    ///
    /// Returns `None` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| read_failed(path, &e))?;
        let file = Self::from_yaml(&content).map_err(|e| parse_failed(path, e))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Some(file.relative_to(base)))
    }

    fn relative_to(self, base: &Path) -> Self {
        let resolve = |p: Option<PathBuf>| p.map(|p| base.join(p));
        Self {
            source_dir: resolve(self.source_dir),
            output_root: resolve(self.output_root),
            record_dir: resolve(self.record_dir),
            diagnostics_log: resolve(self.diagnostics_log),
        }
    }

    fn merge(&mut self, other: Self) {
        if other.source_dir.is_some() {
            self.source_dir = other.source_dir;
        }
        if other.output_root.is_some() {
            self.output_root = other.output_root;
        }
        if other.record_dir.is_some() {
            self.record_dir = other.record_dir;
        }
        if other.diagnostics_log.is_some() {
            self.diagnostics_log = other.diagnostics_log;
        }
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub workspace: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub record_dir: Option<PathBuf>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub workspace: PathBuf,
    pub source_dir: Option<PathBuf>,
    pub output_root: PathBuf,
    pub record_dir: PathBuf,
    pub diagnostics_log: PathBuf,
}

impl Settings {
    /// Resolve settings using the user's global config directory
    pub fn resolve(overrides: &SettingsOverrides) -> Result<Self> {
        Self::resolve_with_global(overrides, global_settings_path().as_deref())
    }

    /// Resolve settings with an explicit global settings file
    pub fn resolve_with_global(
        overrides: &SettingsOverrides,
        global: Option<&Path>,
    ) -> Result<Self> {
        let workspace = match &overrides.workspace {
            Some(path) => path.clone(),
            None => std::env::current_dir()?,
        };

        let mut merged = SettingsFile::default();
        if let Some(global) = global {
            if let Some(file) = SettingsFile::load(global)? {
                merged.merge(file);
            }
        }
        if let Some(file) = SettingsFile::load(&workspace.join(WORKSPACE_SETTINGS_FILE))? {
            merged.merge(file);
        }
        merged.merge(
            SettingsFile {
                source_dir: overrides.source_dir.clone(),
                output_root: overrides.output_root.clone(),
                record_dir: overrides.record_dir.clone(),
                diagnostics_log: None,
            }
            .relative_to(&workspace),
        );

        Ok(Self {
            source_dir: merged.source_dir,
            output_root: merged
                .output_root
                .unwrap_or_else(|| workspace.join("temp_output")),
            record_dir: merged.record_dir.unwrap_or_else(|| workspace.clone()),
            diagnostics_log: merged
                .diagnostics_log
                .unwrap_or_else(|| workspace.join("app.log")),
            workspace,
        })
    }

    /// The configured source directory, required for builds
    pub fn require_source_dir(&self) -> Result<&Path> {
        self.source_dir
            .as_deref()
            .ok_or(BundleError::SourceDirNotConfigured)
    }
}

/// Location of the global settings file, if a config directory can be determined
pub fn global_settings_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir).join("config.yaml"));
    }
    dirs::config_dir().map(|dir| dir.join("shpbundle").join("config.yaml"))
}
