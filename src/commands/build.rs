//! Build command implementation
//!
//! Runs one build request and hands the archive to the caller, either as a
//! summary with the archive path or as raw bytes on stdout.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use console::Style;

use crate::bundle::{BuiltBundle, BundleService};
use crate::catalog::Catalog;
use crate::cli::BuildArgs;
use crate::config::Settings;
use crate::engine::CopyEngine;
use crate::error::Result;
use crate::error::fs::io_error;
use crate::records::RecordLog;

/// Run build command
pub fn run(settings: &Settings, records: RecordLog, args: BuildArgs) -> Result<()> {
    let source_dir = settings.require_source_dir()?;
    let engine = CopyEngine::new(source_dir, Catalog::builtin()?);
    let service = BundleService::new(engine, &settings.output_root, records);

    let built = service.build(&args.target_folder_id, &args.name)?;

    if args.stdout {
        stream_archive(&built.archive_path, &mut io::stdout().lock())?;
        print_summary(&built, &mut io::stderr().lock())?;
    } else {
        if let Some(output) = &args.output {
            std::fs::copy(&built.archive_path, output).map_err(|e| {
                io_error(format!("failed to save archive to {}: {e}", output.display()))
            })?;
        }
        print_summary(&built, &mut io::stdout().lock())?;
    }

    if !built.recorded {
        eprintln!(
            "{} the download of {} was not recorded, see the diagnostics log",
            Style::new().yellow().bold().apply_to("Warning:"),
            built.download_name
        );
    }

    Ok(())
}

fn stream_archive(archive_path: &Path, out: &mut impl Write) -> Result<()> {
    let mut file = File::open(archive_path)?;
    io::copy(&mut file, out)?;
    out.flush()?;
    Ok(())
}

fn print_summary(built: &BuiltBundle, out: &mut impl Write) -> Result<()> {
    let bold = Style::new().bold();
    writeln!(
        out,
        "Built {}",
        Style::new().green().bold().apply_to(&built.download_name)
    )?;
    writeln!(out, "  {} {}", bold.apply_to("Archive:"), built.archive_path.display())?;
    writeln!(out, "  {} {}", bold.apply_to("Download as:"), built.download_name)?;
    writeln!(
        out,
        "  {} {} copied, {} missing from source, {} already present",
        bold.apply_to("Files:"),
        built.report.copied(),
        built.report.missing(),
        built.report.skipped_existing()
    )?;
    Ok(())
}
