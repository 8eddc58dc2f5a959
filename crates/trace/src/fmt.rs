use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use log::debug;
use trace_sexpr::printer::print;

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Reprint netlist and footprint files in canonical layout")]
pub struct FmtArgs {
    /// Files to format
    #[arg(value_name = "PATHS", required = true, value_hint = clap::ValueHint::FilePath)]
    pub paths: Vec<PathBuf>,

    /// Check if files are formatted correctly without modifying them.
    /// Exit with non-zero code if any file needs formatting.
    #[arg(long)]
    pub check: bool,
}

/// Canonical text of a file holding one or more statements.
fn canonical(path: &Path) -> Result<String> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let statements = trace_sexpr::parse_all(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let mut out: String = statements.iter().map(print).collect::<Vec<_>>().join("\n");
    out.push('\n');
    Ok(out)
}

pub fn execute(args: FmtArgs) -> Result<()> {
    let mut needs_format = Vec::new();

    for path in &args.paths {
        debug!("Formatting file: {}", path.display());
        let formatted = canonical(path)?;
        let current = fs::read_to_string(path)?;
        let name = path.display().to_string();

        if formatted == current {
            println!("{} {}", "✓".green(), name.green().bold());
        } else if args.check {
            println!("{} {} (needs formatting)", "!".yellow(), name.yellow().bold());
            needs_format.push(name);
        } else {
            fs::write(path, formatted)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "✓".green(), name.green().bold());
        }
    }

    if !needs_format.is_empty() {
        eprintln!("\n{} files need formatting.", needs_format.len());
        eprintln!("\nRun 'trace fmt {}' to format these files.", needs_format.join(" "));
        anyhow::bail!("Some files are not formatted correctly");
    }
    Ok(())
}
