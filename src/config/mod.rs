//! Configuration handling for shpbundle
//!
//! This module contains:
//! - `shpbundle.yaml` / `~/.config/shpbundle/config.yaml` - settings files
//! - [`Settings`] - resolved paths a build runs with

pub mod settings;

// Re-export commonly used types
pub use settings::{Settings, SettingsOverrides};
