//! Records command implementation
//!
//! Prints the full history of the current record log in file order.

use console::Style;

use crate::cli::RecordsArgs;
use crate::error::Result;
use crate::records::{DownloadRecord, HEADER, RecordLog};

/// Run records command
pub fn run(records: &RecordLog, args: RecordsArgs) -> Result<()> {
    let rows = records.load_records()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{} {}",
        Style::new().bold().apply_to("Record log:"),
        records.path().display()
    );
    if rows.is_empty() {
        println!("No downloads recorded.");
        return Ok(());
    }

    println!("Downloads ({}):", rows.len());
    for line in format_rows(&rows) {
        println!("{line}");
    }
    Ok(())
}

fn format_rows(rows: &[DownloadRecord]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|r| r.file_name.chars().count())
        .chain(std::iter::once(HEADER[0].chars().count()))
        .max()
        .unwrap_or_default();

    let mut lines = vec![format!("  {:<width$}  {}", HEADER[0], HEADER[1])];
    lines.extend(
        rows.iter()
            .map(|r| format!("  {:<width$}  {}", r.file_name, r.person_name)),
    );
    lines
}
