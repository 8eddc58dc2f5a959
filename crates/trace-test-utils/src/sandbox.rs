//! On-disk KiCad library tree for tests.
//!
//! Everything lives under an `assert_fs::TempDir` and is cleaned up on drop.
//!
//! ```no_run
//! use trace_test_utils::LibrarySandbox;
//!
//! let sb = LibrarySandbox::with_kicad_fixtures();
//! assert!(sb.library_dir().join("Device.lib").exists());
//! ```

use assert_fs::TempDir;
use assert_fs::fixture::PathChild;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fixtures;

pub struct LibrarySandbox {
    root: TempDir,
    library_dir: PathBuf,
    footprint_dir: PathBuf,
}

impl Default for LibrarySandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl LibrarySandbox {
    /// Empty sandbox with `library/` and `modules/` directories.
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        let library_dir = root.child("library").to_path_buf();
        let footprint_dir = root.child("modules").to_path_buf();
        fs::create_dir_all(&library_dir).expect("create library dir");
        fs::create_dir_all(&footprint_dir).expect("create modules dir");
        Self {
            root,
            library_dir,
            footprint_dir,
        }
    }

    /// Sandbox holding the `Device`, `Timer` and `power` libraries and the
    /// footprints in [`fixtures::FOOTPRINTS`].
    pub fn with_kicad_fixtures() -> Self {
        let mut sb = Self::new();
        sb.library("Device", fixtures::DEVICE_LIB, Some(fixtures::DEVICE_DCM))
            .library("Timer", fixtures::TIMER_LIB, Some(fixtures::TIMER_DCM))
            .library("power", fixtures::POWER_LIB, None);
        for (dir, name, pads) in fixtures::FOOTPRINTS {
            sb.footprint(dir, name, *pads);
        }
        sb
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    pub fn footprint_dir(&self) -> &Path {
        &self.footprint_dir
    }

    /// Write/overwrite a file relative to the sandbox root.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.root_path().join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    /// Add `library/<name>.lib` and, if given, `library/<name>.dcm`.
    pub fn library(&mut self, name: &str, lib: &str, dcm: Option<&str>) -> &mut Self {
        self.write(format!("library/{name}.lib"), lib);
        if let Some(dcm) = dcm {
            self.write(format!("library/{name}.dcm"), dcm);
        }
        self
    }

    /// Add `modules/<dir>/<name>.kicad_mod` with `pads` pads.
    pub fn footprint(&mut self, dir: &str, name: &str, pads: usize) -> &mut Self {
        self.write(
            format!("modules/{dir}/{name}.kicad_mod"),
            fixtures::kicad_mod(name, pads),
        )
    }

    /// Write a `trace.toml` at the sandbox root pointing at the sandbox
    /// directories and return its path.
    pub fn write_config(&mut self) -> PathBuf {
        let config = format!(
            "[libraries]\nsearch_paths = [{:?}]\n\n[footprints]\ndirs = [{:?}]\n",
            self.library_dir.display().to_string(),
            self.footprint_dir.display().to_string(),
        );
        self.write("trace.toml", config);
        self.root_path().join("trace.toml")
    }
}
