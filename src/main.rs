//! shpbundle - shapefile bundle builder
//!
//! Copies a fixed catalog of shapefile layers out of a source directory under
//! requester-specific names, packs them into one zip archive per request and
//! records every download in a daily CSV log.

use clap::Parser;

mod archive;
mod bundle;
mod catalog;
mod cli;
mod commands;
mod config;
mod diagnostics;
mod engine;
mod error;
mod records;

use cli::{Cli, Commands};
use config::Settings;
use error::Result;

fn run(cli: Cli) -> Result<()> {
    // The record log is named after the start date and keeps that name until exit
    let started = chrono::Local::now().date_naive();
    let overrides = cli.overrides();
    let verbose = cli.verbose;

    match cli.command {
        Commands::Build(args) => {
            let settings = Settings::resolve(&overrides)?;
            diagnostics::init(&settings.diagnostics_log, verbose)?;
            let records = commands::helpers::open_record_log(&settings, started)?;
            commands::build::run(&settings, records, args)
        }
        Commands::Records(args) => {
            let settings = Settings::resolve(&overrides)?;
            diagnostics::init(&settings.diagnostics_log, verbose)?;
            let records = commands::helpers::open_record_log(&settings, started)?;
            commands::records::run(&records, args)
        }
        Commands::Catalog(args) => commands::catalog::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
