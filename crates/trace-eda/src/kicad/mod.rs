pub mod legacy;
pub mod symbol_library;

pub use legacy::{FormatError, LegacyFileKind, RecordError};
pub use symbol_library::LegacySymbolLibrary;
