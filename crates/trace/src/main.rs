use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use trace_core::config::CONFIG_FILE;
use trace_core::{Session, TraceToml};

mod describe;
mod find;
mod fmt;
mod footprints;

#[derive(Parser)]
#[command(name = "trace")]
#[command(about = "Browse part libraries and footprints for code-first board design", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    /// Path to trace.toml (defaults to ./trace.toml when present)
    #[arg(short = 'c', long = "config", global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search all libraries for parts
    #[command(alias = "f")]
    Find(find::FindArgs),

    /// Show a part's pins and footprint candidates
    Describe(describe::DescribeArgs),

    /// List registered footprints
    Footprints(footprints::FootprintsArgs),

    /// Reprint S-expression files in canonical layout
    Fmt(fmt::FmtArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug, RUST_LOG still wins
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Find(args) => find::execute(args, config),
        Commands::Describe(args) => describe::execute(args, config),
        Commands::Footprints(args) => footprints::execute(args, config),
        Commands::Fmt(args) => fmt::execute(args),
    }
}

/// Load the configuration named on the command line, `./trace.toml`, or the
/// built-in defaults, in that order.
pub(crate) fn load_config(path: Option<&Path>) -> Result<TraceToml> {
    match path {
        Some(path) => TraceToml::from_file(path),
        None if Path::new(CONFIG_FILE).is_file() => TraceToml::from_file(Path::new(CONFIG_FILE)),
        None => Ok(TraceToml::default()),
    }
}

pub(crate) fn open_session(config: Option<&Path>) -> Result<Session> {
    let config = load_config(config)?;
    log::debug!("Library search paths: {:?}", config.library_search_paths());
    Session::from_config(&config)
}
