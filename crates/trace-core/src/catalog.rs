//! Lazily loaded part libraries and the footprint registry.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::RegexBuilder;
use trace_eda::{Footprint, Symbol};
use walkdir::WalkDir;

use crate::component::CustomPinResolver;
use crate::error::{CatalogError, QueryError};
use crate::importer::{Importer, KicadImporter};
use crate::part::{Part, UserPart, safe_identifier};
use crate::pin::PinName;
use crate::session::{FootprintId, PartId};

/// Name of the library whose parts act as power sources.
pub const DEFAULT_POWER_LIBRARY: &str = "power";

/// Library holding parts registered from code.
pub const USER_LIBRARY: &str = "user";

/// A loaded library: its parts in file order, indexed by name and alias.
#[derive(Debug, Clone)]
pub struct Library {
    name: String,
    path: Option<PathBuf>,
    parts: Vec<PartId>,
    index: HashMap<String, PartId>,
}

impl Library {
    fn new(name: &str, path: Option<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            path,
            parts: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the library was read from; `None` for in-memory libraries.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn parts(&self) -> &[PartId] {
        &self.parts
    }

    /// Look up a part by name or alias.
    pub fn get(&self, name: &str) -> Option<PartId> {
        self.index.get(name).copied()
    }

    /// Add a part under each of `names`. A name already taken keeps its
    /// first part.
    fn add(&mut self, id: PartId, names: Vec<String>) {
        self.parts.push(id);
        for name in names {
            match self.index.entry(name) {
                Entry::Occupied(entry) => log::warn!(
                    "{}:{} is already defined, keeping the first definition",
                    self.name,
                    entry.key()
                ),
                Entry::Vacant(entry) => {
                    entry.insert(id);
                }
            }
        }
    }
}

/// Registry mapping `(library, part)` to parts, populated on first access.
pub struct Catalog {
    search_paths: Vec<PathBuf>,
    importers: Vec<Box<dyn Importer>>,
    /// `None` records a library that could not be found
    libraries: HashMap<String, Option<Library>>,
    parts: Vec<Part>,
    identifiers: HashMap<String, PartId>,
    footprints: Vec<Footprint>,
    power_library: String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl Catalog {
    /// Catalog reading KiCad libraries from `search_paths`, in order.
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            importers: vec![Box::new(KicadImporter)],
            libraries: HashMap::new(),
            parts: Vec::new(),
            identifiers: HashMap::new(),
            footprints: Vec::new(),
            power_library: DEFAULT_POWER_LIBRARY.to_string(),
        }
    }

    /// Catalog with no search paths. Only user parts and explicitly loaded
    /// files are available.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Try `importer` after the ones already registered.
    pub fn add_importer(&mut self, importer: impl Importer + 'static) -> &mut Self {
        self.importers.push(Box::new(importer));
        self
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.search_paths.push(path.into());
        self
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn power_library(&self) -> &str {
        &self.power_library
    }

    pub fn set_power_library(&mut self, name: impl Into<String>) -> &mut Self {
        self.power_library = name.into();
        self
    }

    /// Whether `part` comes from the power library.
    pub fn is_power_part(&self, part: PartId) -> bool {
        self.part(part).library() == self.power_library
    }

    /// Return the library called `name`, loading it on first use.
    ///
    /// Each importer is tried against every search path; the first file that
    /// loads wins. A miss is remembered and reported again on later calls
    /// without touching the filesystem.
    pub fn get_or_load(&mut self, name: &str) -> Result<&Library, CatalogError> {
        if !self.libraries.contains_key(name) {
            let loaded = self.find_library(name);
            let library = loaded.map(|(path, symbols)| self.install(name, Some(path), symbols));
            if library.is_none() {
                log::warn!("Library {name} not found in {} search paths", self.search_paths.len());
            }
            self.libraries.insert(name.to_string(), library);
        }

        match self.libraries.get(name) {
            Some(Some(library)) => Ok(library),
            _ => Err(CatalogError::LibraryNotFound {
                name: name.to_string(),
            }),
        }
    }

    fn find_library(&self, name: &str) -> Option<(PathBuf, Vec<Symbol>)> {
        for importer in &self.importers {
            for dir in &self.search_paths {
                let path = importer.library_path(dir, name);
                if !path.is_file() {
                    continue;
                }
                match importer.load_library(&path) {
                    Ok(symbols) => {
                        log::debug!("Loaded {name} with the {} importer", importer.name());
                        return Some((path, symbols));
                    }
                    Err(e) => log::warn!("{e:#}"),
                }
            }
        }
        None
    }

    /// Load a library file directly, naming the library after the file.
    /// Loading a library name that is already cached returns the cached one.
    pub fn load_library_file(&mut self, path: &Path) -> Result<&Library> {
        let (importer, name) = self
            .importers
            .iter()
            .find_map(|imp| imp.library_name(path).map(|name| (imp, name)))
            .with_context(|| format!("No importer accepts {}", path.display()))?;

        if !matches!(self.libraries.get(&name), Some(Some(_))) {
            let symbols = importer.load_library(path)?;
            let library = self.install(&name, Some(path.to_path_buf()), symbols);
            self.libraries.insert(name.clone(), Some(library));
        }
        Ok(self.get_or_load(&name)?)
    }

    /// Load every library file found directly inside the search paths.
    /// Returns the number of libraries available afterwards.
    pub fn load_all(&mut self) -> Result<usize> {
        let mut files = Vec::new();
        for dir in &self.search_paths {
            if !dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(dir).max_depth(1).sort_by_file_name() {
                let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        }

        for path in files {
            let accepted = self.importers.iter().any(|imp| imp.library_name(&path).is_some());
            if accepted {
                if let Err(e) = self.load_library_file(&path) {
                    log::warn!("{e:#}");
                }
            }
        }
        Ok(self.libraries().count())
    }

    /// Successfully loaded libraries, sorted by name.
    pub fn libraries(&self) -> impl Iterator<Item = &Library> {
        let mut libraries: Vec<&Library> = self.libraries.values().flatten().collect();
        libraries.sort_by(|a, b| a.name.cmp(&b.name));
        libraries.into_iter()
    }

    fn install(&mut self, name: &str, path: Option<PathBuf>, symbols: Vec<Symbol>) -> Library {
        let mut library = Library::new(name, path);
        for mut symbol in symbols {
            symbol.library = name.to_string();
            if let Err(e) = validate_pins(&symbol) {
                log::warn!("Skipping {name}:{}: {e}", symbol.name);
                continue;
            }
            let names: Vec<String> = std::iter::once(symbol.name.clone())
                .chain(symbol.aliases.iter().cloned())
                .collect();
            let id = self.push_part(symbol, None, None);
            library.add(id, names);
        }
        log::debug!("Library {name}: {} parts", library.parts.len());
        library
    }

    fn push_part(
        &mut self,
        symbol: Symbol,
        default_footprint: Option<FootprintId>,
        resolver: Option<Box<dyn CustomPinResolver>>,
    ) -> PartId {
        let id = PartId(self.parts.len());
        let base = safe_identifier(&symbol.name);
        let mut identifier = base.clone();
        let mut n = 0;
        while self.identifiers.contains_key(&identifier) {
            n += 1;
            identifier = format!("{base}_{n}");
        }
        if n > 0 {
            log::warn!(
                "Part {}:{} renamed to {identifier}, {base} is already taken",
                symbol.library,
                symbol.name
            );
        }

        self.identifiers.insert(identifier.clone(), id);
        self.parts.push(Part {
            id,
            identifier,
            symbol,
            default_footprint,
            resolver,
        });
        id
    }

    /// Register a part defined in code. It lands in its symbol's library,
    /// or the `user` library if none is set.
    pub fn register_part(&mut self, user: UserPart) -> Result<PartId, CatalogError> {
        let UserPart {
            mut symbol,
            footprint,
            resolver,
        } = user;
        validate_pins(&symbol)?;
        if symbol.library.is_empty() {
            symbol.library = USER_LIBRARY.to_string();
        }

        let library_name = symbol.library.clone();
        let names: Vec<String> = std::iter::once(symbol.name.clone())
            .chain(symbol.aliases.iter().cloned())
            .collect();
        let default_footprint = footprint.map(|fp| self.add_footprint(fp));
        let id = self.push_part(symbol, default_footprint, resolver);

        // Parts registered into a library on disk join the loaded library
        if !self.libraries.contains_key(&library_name) {
            let loaded = self
                .find_library(&library_name)
                .map(|(path, symbols)| self.install(&library_name, Some(path), symbols));
            self.libraries.insert(library_name.clone(), loaded);
        }
        let library = self
            .libraries
            .entry(library_name.clone())
            .or_insert(None)
            .get_or_insert_with(|| Library::new(&library_name, None));
        library.add(id, names);
        Ok(id)
    }

    /// Find a part by library and part name (or alias), loading the library
    /// if needed.
    pub fn part_id(&mut self, library: &str, name: &str) -> Result<PartId, CatalogError> {
        self.get_or_load(library)?
            .get(name)
            .ok_or_else(|| CatalogError::PartNotFound {
                library: library.to_string(),
                part: name.to_string(),
            })
    }

    pub fn part(&self, id: PartId) -> &Part {
        &self.parts[id.0]
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part_by_identifier(&self, identifier: &str) -> Option<PartId> {
        self.identifiers.get(identifier).copied()
    }

    /// Parts whose identifier matches `pattern`, case-insensitively, among
    /// the libraries loaded so far.
    pub fn search(&self, pattern: &str) -> Result<Vec<PartId>, QueryError> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| QueryError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(self
            .parts
            .iter()
            .filter(|p| re.is_match(&p.identifier))
            .map(|p| p.id)
            .collect())
    }

    /// Human readable summary: identifier, library, then pins by number.
    pub fn describe(&self, id: PartId) -> String {
        let part = self.part(id);
        let mut out = format!("{} ({}:{})", part.identifier, part.library(), part.name());
        if !part.symbol.description().is_empty() {
            out.push_str(" - ");
            out.push_str(part.symbol.description());
        }

        let mut pins: Vec<_> = part.symbol.pins.iter().collect();
        pins.sort_by_key(|p| pin_number_key(&p.number));
        for pin in pins {
            out.push_str(&format!("\n  {} {} {}", pin.number, pin.name, pin.electrical_kind));
        }
        out
    }

    /// Register every footprint file below `dir`, visiting entries in file
    /// name order. Returns how many were added.
    pub fn load_footprints(&mut self, dir: &Path) -> Result<usize> {
        let mut added = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(importer) = self.importers.iter().find(|imp| imp.is_footprint_file(path))
            else {
                continue;
            };
            let footprint = importer.load_footprint(path)?;
            self.add_footprint(footprint);
            added += 1;
        }
        log::debug!("Registered {added} footprints from {}", dir.display());
        Ok(added)
    }

    pub fn add_footprint(&mut self, footprint: Footprint) -> FootprintId {
        self.footprints.push(footprint);
        FootprintId(self.footprints.len() - 1)
    }

    pub fn footprint(&self, id: FootprintId) -> &Footprint {
        &self.footprints[id.0]
    }

    /// Registered footprints with their ids, in registration order.
    pub fn footprints(&self) -> impl Iterator<Item = (FootprintId, &Footprint)> {
        self.footprints
            .iter()
            .enumerate()
            .map(|(i, fp)| (FootprintId(i), fp))
    }

    /// Find a footprint by `name` or `group:name`.
    pub fn find_footprint(&self, name: &str) -> Option<FootprintId> {
        self.footprints()
            .find(|(_, fp)| fp.name == name || fp.qualified_name() == name)
            .map(|(id, _)| id)
    }
}

fn validate_pins(symbol: &Symbol) -> Result<(), CatalogError> {
    for pin in &symbol.pins {
        PinName::parse(&pin.name).map_err(|source| CatalogError::MalformedPinName {
            part: symbol.name.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Sort numeric pin numbers numerically, ahead of any others.
fn pin_number_key(number: &str) -> (bool, u64, String) {
    match number.parse::<u64>() {
        Ok(n) => (false, n, String::new()),
        Err(_) => (true, 0, number.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trace_eda::{ElectricalKind, PinDescriptor};
    use trace_test_utils::{LibrarySandbox, fixtures};

    fn sandbox_catalog(sb: &LibrarySandbox) -> Catalog {
        Catalog::new(vec![sb.library_dir().to_path_buf()])
    }

    #[test]
    fn loads_library_on_first_access() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = sandbox_catalog(&sb);

        let library = catalog.get_or_load("Device").unwrap();
        assert_eq!(library.parts().len(), 4);
        let r = catalog.part_id("Device", "R_US").unwrap();
        assert_eq!(catalog.part(r).library(), "Device");
        assert_eq!(catalog.part(r).identifier, "R_US");

        // Second access hits the cache
        assert_eq!(catalog.part_id("Device", "R_US").unwrap(), r);
        assert_eq!(catalog.parts().len(), 4);
    }

    #[test]
    fn aliases_resolve_to_the_same_part() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = sandbox_catalog(&sb);
        let d = catalog.part_id("Timer", "NE555D").unwrap();
        let p = catalog.part_id("Timer", "NE555P").unwrap();
        assert_eq!(d, p);
    }

    #[test]
    fn missing_library_is_memoized() {
        let mut sb = LibrarySandbox::new();
        let mut catalog = sandbox_catalog(&sb);
        assert!(matches!(
            catalog.get_or_load("Device"),
            Err(CatalogError::LibraryNotFound { .. })
        ));

        // Appearing later does not matter, the miss is cached
        sb.library("Device", fixtures::DEVICE_LIB, None);
        assert!(catalog.get_or_load("Device").is_err());
    }

    #[test]
    fn missing_part_is_reported() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = sandbox_catalog(&sb);
        let err = catalog.part_id("Device", "L").unwrap_err();
        assert_eq!(err.to_string(), "part 'L' not found in library 'Device'");
    }

    #[test]
    fn malformed_pin_names_skip_only_that_part() {
        let mut sb = LibrarySandbox::new();
        sb.library("Broken", fixtures::MALFORMED_LIB, None);
        let mut catalog = sandbox_catalog(&sb);
        assert!(catalog.part_id("Broken", "GOOD").is_ok());
        assert!(matches!(
            catalog.part_id("Broken", "BAD"),
            Err(CatalogError::PartNotFound { .. })
        ));
    }

    #[test]
    fn identifier_collisions_get_suffixes() {
        let mut sb = LibrarySandbox::new();
        sb.library("A", fixtures::POWER_LIB, None)
            .library("B", fixtures::POWER_LIB, None);
        let mut catalog = sandbox_catalog(&sb);
        let a = catalog.part_id("A", "GND").unwrap();
        let b = catalog.part_id("B", "GND").unwrap();
        assert_eq!(catalog.part(a).identifier, "GND");
        assert_eq!(catalog.part(b).identifier, "GND_1");
    }

    #[test]
    fn load_all_and_search() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = sandbox_catalog(&sb);
        assert_eq!(catalog.load_all().unwrap(), 3);

        let names: Vec<_> = catalog
            .search("^ne5")
            .unwrap()
            .into_iter()
            .map(|id| catalog.part(id).identifier.as_str())
            .collect();
        assert_eq!(names, ["NE555D"]);
        assert!(matches!(
            catalog.search("("),
            Err(QueryError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn user_parts_carry_their_footprint() {
        let mut catalog = Catalog::empty();
        let mut symbol = Symbol {
            name: "PinHead_2".into(),
            reference: "J".into(),
            ..Symbol::default()
        };
        symbol.pins = vec![
            PinDescriptor::new("1", "P1", ElectricalKind::Passive),
            PinDescriptor::new("2", "P2", ElectricalKind::Passive),
        ];
        let fp = Footprint::new("", "PinHead_2", vec![]);
        let id = catalog
            .register_part(UserPart::new(symbol).footprint(fp))
            .unwrap();

        assert_eq!(catalog.part_id(USER_LIBRARY, "PinHead_2").unwrap(), id);
        let fp = catalog.part(id).default_footprint.unwrap();
        assert_eq!(catalog.footprint(fp).name, "PinHead_2");
    }

    #[test]
    fn user_parts_join_libraries_on_disk() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = sandbox_catalog(&sb);
        let symbol = Symbol {
            library: "Device".into(),
            name: "MyPart".into(),
            reference: "X".into(),
            pins: vec![PinDescriptor::new("1", "A", ElectricalKind::Passive)],
            ..Symbol::default()
        };
        let mine = catalog.register_part(UserPart::new(symbol)).unwrap();

        assert_eq!(catalog.part_id("Device", "MyPart").unwrap(), mine);
        let r = catalog.part_id("Device", "R_US").unwrap();
        assert_eq!(catalog.part(r).library(), "Device");
        assert!(catalog.get_or_load("Device").unwrap().path().is_some());
    }

    #[test]
    fn registered_names_do_not_replace_library_parts() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = sandbox_catalog(&sb);
        let original = catalog.part_id("Device", "R_US").unwrap();

        let symbol = Symbol {
            library: "Device".into(),
            name: "R_US".into(),
            reference: "R".into(),
            pins: vec![PinDescriptor::new("1", "A", ElectricalKind::Passive)],
            ..Symbol::default()
        };
        let shadow = catalog.register_part(UserPart::new(symbol)).unwrap();

        assert_ne!(shadow, original);
        assert_eq!(catalog.part_id("Device", "R_US").unwrap(), original);
        assert_eq!(catalog.part(shadow).identifier, "R_US_1");
    }

    #[test]
    fn footprints_load_in_name_order() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = Catalog::empty();
        assert_eq!(catalog.load_footprints(sb.footprint_dir()).unwrap(), 7);

        let names: Vec<_> = catalog.footprints().map(|(_, fp)| fp.name.as_str()).collect();
        assert_eq!(names[0], "C_Disc_D3.0mm_W1.6mm_P2.50mm");
        let soic = catalog.find_footprint("Package_SO:SOIC-8_3.9x4.9mm_P1.27mm").unwrap();
        assert_eq!(catalog.footprint(soic).pad_count, 8);
        assert_eq!(catalog.footprint(soic).group, "Package_SO");
    }

    #[test]
    fn describe_lists_pins_by_number() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = sandbox_catalog(&sb);
        let q = catalog.part_id("Device", "Q_PNP_EBC").unwrap();
        let text = catalog.describe(q);
        let lines: Vec<_> = text.lines().skip(1).collect();
        assert_eq!(lines, ["  1 E Passive", "  2 B Input", "  3 C Passive"]);
    }
}
