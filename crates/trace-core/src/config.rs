use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_POWER_LIBRARY;

/// File name looked up in the working directory by the CLI.
pub const CONFIG_FILE: &str = "trace.toml";

/// Environment variable with extra library directories, searched first.
pub const LIBRARY_PATH_ENV: &str = "TRACE_LIBRARY_PATH";

/// Top-level trace.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceToml {
    #[serde(default)]
    pub libraries: LibrariesConfig,

    #[serde(default)]
    pub footprints: FootprintsConfig,

    #[serde(default)]
    pub netlist: NetlistConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrariesConfig {
    /// Directories holding `.lib` files, searched in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<PathBuf>,

    /// Library whose parts count as power sources for ERC
    #[serde(default = "default_power_library")]
    pub power_library: String,
}

impl Default for LibrariesConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            power_library: default_power_library(),
        }
    }
}

fn default_power_library() -> String {
    DEFAULT_POWER_LIBRARY.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FootprintsConfig {
    /// Directories scanned recursively for `.kicad_mod` files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetlistConfig {
    /// Overrides the `(tool ..)` field of generated netlists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl TraceToml {
    /// Parse from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse trace.toml: {e}"))
    }

    /// Read a config file. Relative paths inside it are resolved against the
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config =
            Self::parse(&content).with_context(|| format!("failed to parse {}", path.display()))?;

        if let Some(base) = path.parent() {
            for p in config
                .libraries
                .search_paths
                .iter_mut()
                .chain(config.footprints.dirs.iter_mut())
            {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }
        Ok(config)
    }

    /// Library directories: `TRACE_LIBRARY_PATH` entries, then the configured
    /// ones, or the platform's KiCad library directory if none are set.
    pub fn library_search_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = std::env::var_os(LIBRARY_PATH_ENV)
            .map(|v| std::env::split_paths(&v).collect())
            .unwrap_or_default();
        if self.libraries.search_paths.is_empty() {
            paths.push(default_kicad_dir().join("library"));
        } else {
            paths.extend(self.libraries.search_paths.iter().cloned());
        }
        paths
    }

    /// Footprint directories, defaulting to the platform's KiCad modules.
    pub fn footprint_dirs(&self) -> Vec<PathBuf> {
        if self.footprints.dirs.is_empty() {
            vec![default_kicad_dir().join("modules")]
        } else {
            self.footprints.dirs.clone()
        }
    }
}

fn default_kicad_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Program Files\KiCad\share\kicad")
    } else {
        PathBuf::from("/usr/share/kicad")
    }
}
