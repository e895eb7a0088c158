//! Catalog command implementation

use console::Style;

use crate::catalog::Catalog;
use crate::cli::CatalogArgs;
use crate::error::Result;

/// Run catalog command
pub fn run(args: CatalogArgs) -> Result<()> {
    let catalog = Catalog::builtin()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    let bold = Style::new().bold();
    println!("{}", bold.apply_to(format!("Source files ({}):", catalog.entries().len())));
    for entry in catalog.entries() {
        let class = entry
            .class
            .map_or_else(|| "unclassified".to_string(), |c| c.to_string());
        println!("  {:<16} {}", entry.file_name, Style::new().cyan().apply_to(class));
    }

    println!();
    println!("{}", bold.apply_to(format!("Categories ({}):", catalog.categories().len())));
    for label in catalog.categories() {
        println!("  {label}");
    }
    Ok(())
}
