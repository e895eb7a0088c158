//! Command implementations for shpbundle CLI

pub mod build;
pub mod catalog;
pub mod completions;
pub mod helpers;
pub mod records;
pub mod version;
