use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use trace_core::footprint::glob_to_regex;

#[derive(Args, Debug)]
pub struct FootprintsArgs {
    /// Only list footprints whose name or `group:name` matches this glob
    #[arg(value_name = "GLOB")]
    pub filter: Option<String>,
}

pub fn execute(args: FootprintsArgs, config: Option<&Path>) -> Result<()> {
    let session = crate::open_session(config)?;
    let filter = args
        .filter
        .as_deref()
        .map(glob_to_regex)
        .transpose()
        .context("Invalid footprint filter")?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::DynamicFullWidth);
    table.set_header(vec!["Footprint", "Pads"]);

    let mut shown = 0;
    for (_, fp) in session.catalog().footprints() {
        let qualified = fp.qualified_name();
        if filter
            .as_ref()
            .is_some_and(|re| !re.is_match(&fp.name) && !re.is_match(&qualified))
        {
            continue;
        }
        table.add_row(vec![qualified, fp.pad_count.to_string()]);
        shown += 1;
    }

    if shown == 0 {
        anyhow::bail!("No footprints found");
    }
    println!("{table}");
    Ok(())
}
