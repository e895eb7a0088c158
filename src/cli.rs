//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::SettingsOverrides;

/// shpbundle - shapefile bundle builder
///
/// Copy a fixed set of shapefile layers under requester-specific names, pack them
/// into a zip archive and record every download.
#[derive(Parser, Debug)]
#[command(
    name = "shpbundle",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Package renamed shapefile layer sets into zip bundles",
    long_about = "shpbundle copies a fixed catalog of shapefile sidecar files out of a source \
                  directory, renames them after a requester, fans resource layers out into one \
                  folder per land-use category, zips the result and records the download.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  shpbundle --source-dir ./layers build cunA 村A\n    \
                  shpbundle build cunA 村A --output ~/Downloads/cunA_files.zip\n    \
                  shpbundle records\n    \
                  shpbundle catalog"
)]
pub struct Cli {
    /// Workspace directory (defaults to current directory)
    #[arg(long, short = 'w', global = true, env = "SHPBUNDLE_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Directory holding the source shapefile layers
    #[arg(long, global = true, env = "SHPBUNDLE_SOURCE_DIR")]
    pub source_dir: Option<PathBuf>,

    /// Directory under which per-target output folders are created
    #[arg(long, global = true, env = "SHPBUNDLE_OUTPUT_ROOT")]
    pub output_root: Option<PathBuf>,

    /// Directory holding the daily download record logs
    #[arg(long, global = true, env = "SHPBUNDLE_RECORD_DIR")]
    pub record_dir: Option<PathBuf>,

    /// Mirror diagnostics events to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            workspace: self.workspace.clone(),
            source_dir: self.source_dir.clone(),
            output_root: self.output_root.clone(),
            record_dir: self.record_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and record a bundle for one target folder
    Build(BuildArgs),

    /// Show the download records of today's log
    Records(RecordsArgs),

    /// Show the source file catalog and category list
    Catalog(CatalogArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the build command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Build into temp_output/cunA:\n    shpbundle build cunA 村A\n\n\
                  Stream the archive to stdout:\n    shpbundle build cunA 村A --stdout > cunA_files.zip\n\n\
                  Save a copy of the archive:\n    shpbundle build cunA 村A --output ./cunA_files.zip")]
pub struct BuildArgs {
    /// Target folder id; names the output folder and the archive
    pub target_folder_id: String,

    /// Name used as the filename prefix and recorded with the download
    pub name: String,

    /// Write the archive bytes to stdout instead of a summary
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Also copy the archive to this file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the records command
#[derive(Parser, Debug)]
pub struct RecordsArgs {
    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the catalog command
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    shpbundle completions --shell bash > ~/.bash_completion.d/shpbundle\n\n\
                  Generate zsh completions:\n    shpbundle completions --shell zsh > ~/.zfunc/_shpbundle")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
