//! Version command implementation
//!
//! Besides the crate version, reports the built-in catalog the binary was
//! compiled with and where global settings are read from.

use std::io::{self, Write};

use crate::catalog::Catalog;
use crate::config::settings::global_settings_path;
use crate::error::Result;

/// Run version command
pub fn run() -> Result<()> {
    let catalog = Catalog::builtin()?;
    write_version(&catalog, &mut io::stdout().lock())
}

fn write_version(catalog: &Catalog, out: &mut impl Write) -> Result<()> {
    writeln!(out, "shpbundle {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out)?;
    writeln!(out, "Built-in catalog:")?;
    writeln!(out, "  Source files: {}", catalog.entries().len())?;
    writeln!(out, "  Categories: {}", catalog.categories().len())?;
    writeln!(out, "Settings:")?;
    match global_settings_path() {
        Some(path) => writeln!(out, "  Global file: {}", path.display())?,
        None => writeln!(out, "  Global file: unavailable")?,
    }
    writeln!(
        out,
        "  Minimum Rust: {} ({} build)",
        env!("CARGO_PKG_RUST_VERSION"),
        if cfg!(debug_assertions) { "debug" } else { "release" }
    )?;
    Ok(())
}
