use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::legacy::{
    LegacyFileKind, check_library_header, parse_doc_block, parse_symbol_block, scan_definitions,
};
use crate::{Doc, Symbol};

/// A legacy KiCad symbol library: a `.lib` file with an optional `.dcm`
/// companion holding part documentation.
#[derive(Debug, Clone, Default)]
pub struct LegacySymbolLibrary {
    name: String,
    symbols: Vec<Symbol>,
}

impl LegacySymbolLibrary {
    /// Parse library text, attaching docs from `doc_text` by part name.
    ///
    /// A definition that fails to parse is logged and skipped; the rest of
    /// the library still loads.
    pub fn from_strings(name: &str, lib_text: &str, doc_text: Option<&str>) -> Result<Self> {
        check_library_header(lib_text, LegacyFileKind::Library)?;

        let mut docs: HashMap<String, Doc> = HashMap::new();
        if let Some(doc_text) = doc_text {
            check_library_header(doc_text, LegacyFileKind::DocLibrary)?;
            let (open, close) = LegacyFileKind::DocLibrary.block_markers();
            for block in scan_definitions(doc_text, open, close) {
                let doc = parse_doc_block(block.text);
                docs.insert(doc.name.clone(), doc);
            }
        }

        let (open, close) = LegacyFileKind::Library.block_markers();
        let mut symbols = Vec::new();
        for block in scan_definitions(lib_text, open, close) {
            match parse_symbol_block(block.text) {
                Ok(mut symbol) => {
                    symbol.library = name.to_string();
                    symbol.doc = docs.get(&symbol.name).cloned().unwrap_or_default();
                    symbols.push(symbol);
                }
                Err(e) => {
                    log::warn!(
                        "Skipping definition at {name}.lib:{}: {e}",
                        block.line_in(lib_text)
                    );
                }
            }
        }

        log::debug!("Parsed {} symbols from library {name}", symbols.len());
        Ok(Self {
            name: name.to_string(),
            symbols,
        })
    }

    /// Load `<path>` (a `.lib` file) and `<path>` with a `.dcm` extension
    /// if that exists. The library is named after the file stem.
    pub fn from_file(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Library path has no file name: {}", path.display()))?;
        let lib_text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read library {}", path.display()))?;

        let doc_path = path.with_extension("dcm");
        let doc_text = if doc_path.exists() {
            Some(
                fs::read_to_string(&doc_path)
                    .with_context(|| format!("Failed to read docs {}", doc_path.display()))?,
            )
        } else {
            None
        };

        Self::from_strings(name, &lib_text, doc_text.as_deref())
            .with_context(|| format!("Failed to load library {}", path.display()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn symbol_names(&self) -> Vec<&str> {
        self.symbols.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }
}
