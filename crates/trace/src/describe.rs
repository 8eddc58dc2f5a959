use std::path::Path;

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use trace_eda::{Footprint, Symbol};

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum DescribeFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for DescribeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DescribeFormat::Text => write!(f, "text"),
            DescribeFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Library holding the part, e.g. `Device`
    pub library: String,

    /// Part name or alias, e.g. `R_US`
    pub part: String,

    /// Output format
    #[arg(short, long, default_value_t = DescribeFormat::Text)]
    pub format: DescribeFormat,
}

#[derive(Serialize)]
struct PartDescription<'a> {
    identifier: &'a str,
    symbol: &'a Symbol,
    footprints: Vec<&'a Footprint>,
}

pub fn execute(args: DescribeArgs, config: Option<&Path>) -> Result<()> {
    let mut session = crate::open_session(config)?;
    let part = session.part(&args.library, &args.part)?;
    let candidates = session.candidates(part).to_vec();
    let catalog = session.catalog();

    if let DescribeFormat::Json = args.format {
        let description = PartDescription {
            identifier: &catalog.part(part).identifier,
            symbol: &catalog.part(part).symbol,
            footprints: candidates.iter().map(|&id| catalog.footprint(id)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&description)?);
        return Ok(());
    }

    println!("{}", catalog.describe(part));
    if candidates.is_empty() {
        println!("{}", "No matching footprints".yellow());
        return Ok(());
    }
    println!("{}", "Footprints:".bold());
    for id in candidates {
        println!("  {}", catalog.footprint(id).qualified_name());
    }
    Ok(())
}
