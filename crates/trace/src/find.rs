use std::path::Path;

use anyhow::Result;
use clap::Args;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use log::debug;

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Regular expression matched against part identifiers, case-insensitive
    #[arg(value_name = "PATTERN")]
    pub pattern: String,
}

pub fn execute(args: FindArgs, config: Option<&Path>) -> Result<()> {
    let mut session = crate::open_session(config)?;
    let loaded = session.catalog_mut().load_all()?;
    debug!("Loaded {loaded} libraries");

    let catalog = session.catalog();
    let matches = catalog.search(&args.pattern)?;
    if matches.is_empty() {
        anyhow::bail!("No parts match '{}'", args.pattern);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::DynamicFullWidth);
    table.set_header(vec!["Identifier", "Library", "Part", "Pins", "Description"]);
    for id in matches {
        let part = catalog.part(id);
        table.add_row(vec![
            part.identifier.clone(),
            part.library().to_string(),
            part.name().to_string(),
            part.pin_count().to_string(),
            part.symbol.description().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
