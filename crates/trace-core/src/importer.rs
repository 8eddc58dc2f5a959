//! Readers that turn library files on disk into symbols and footprints.

use std::path::{Path, PathBuf};

use anyhow::Result;
use trace_eda::kicad::LegacySymbolLibrary;
use trace_eda::{Footprint, Symbol};

/// A library file format the catalog can load from.
pub trait Importer {
    fn name(&self) -> &'static str;

    /// Where a library called `name` would live inside `dir`.
    fn library_path(&self, dir: &Path, name: &str) -> PathBuf;

    /// Library name for a file this importer can read, `None` otherwise.
    fn library_name(&self, path: &Path) -> Option<String>;

    fn load_library(&self, path: &Path) -> Result<Vec<Symbol>>;

    fn is_footprint_file(&self, path: &Path) -> bool;

    fn load_footprint(&self, path: &Path) -> Result<Footprint>;
}

/// KiCad legacy `.lib` symbol libraries (with an optional `.dcm` next to
/// them) and `.kicad_mod` footprints.
#[derive(Debug, Default, Clone, Copy)]
pub struct KicadImporter;

impl Importer for KicadImporter {
    fn name(&self) -> &'static str {
        "kicad"
    }

    fn library_path(&self, dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{name}.lib"))
    }

    fn library_name(&self, path: &Path) -> Option<String> {
        if path.extension()? != "lib" {
            return None;
        }
        path.file_stem()?.to_str().map(str::to_string)
    }

    fn load_library(&self, path: &Path) -> Result<Vec<Symbol>> {
        Ok(LegacySymbolLibrary::from_file(path)?.into_symbols())
    }

    fn is_footprint_file(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "kicad_mod")
    }

    fn load_footprint(&self, path: &Path) -> Result<Footprint> {
        Footprint::from_kicad_mod(path)
    }
}
