//! Library part definitions (symbols) and physical footprints, plus readers
//! for the KiCad legacy `.lib`/`.dcm` formats and `.kicad_mod` files.

pub mod footprint;
pub mod kicad;

use serde::Serialize;

pub use footprint::{Drill, Footprint, Pad, PadShape, PadType};

/// Electrical role of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElectricalKind {
    Input,
    Output,
    Bidirectional,
    Tristate,
    Passive,
    Unspecified,
    PowerIn,
    PowerOut,
    OpenCollector,
    OpenEmitter,
    NotConnected,
}

impl ElectricalKind {
    pub const ALL: [ElectricalKind; 11] = [
        ElectricalKind::Input,
        ElectricalKind::Output,
        ElectricalKind::Bidirectional,
        ElectricalKind::Tristate,
        ElectricalKind::Passive,
        ElectricalKind::Unspecified,
        ElectricalKind::PowerIn,
        ElectricalKind::PowerOut,
        ElectricalKind::OpenCollector,
        ElectricalKind::OpenEmitter,
        ElectricalKind::NotConnected,
    ];

    /// Decode the single-letter type used in legacy `X` pin records.
    pub fn from_code(code: &str) -> Option<Self> {
        let kind = match code {
            "I" => ElectricalKind::Input,
            "O" => ElectricalKind::Output,
            "B" => ElectricalKind::Bidirectional,
            "T" => ElectricalKind::Tristate,
            "P" => ElectricalKind::Passive,
            "U" => ElectricalKind::Unspecified,
            "W" => ElectricalKind::PowerIn,
            "w" => ElectricalKind::PowerOut,
            "C" => ElectricalKind::OpenCollector,
            "E" => ElectricalKind::OpenEmitter,
            "N" => ElectricalKind::NotConnected,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(self) -> &'static str {
        match self {
            ElectricalKind::Input => "I",
            ElectricalKind::Output => "O",
            ElectricalKind::Bidirectional => "B",
            ElectricalKind::Tristate => "T",
            ElectricalKind::Passive => "P",
            ElectricalKind::Unspecified => "U",
            ElectricalKind::PowerIn => "W",
            ElectricalKind::PowerOut => "w",
            ElectricalKind::OpenCollector => "C",
            ElectricalKind::OpenEmitter => "E",
            ElectricalKind::NotConnected => "N",
        }
    }

    /// Pin type as written in KiCad netlists.
    pub fn netlist_type(self) -> &'static str {
        match self {
            ElectricalKind::Input => "input",
            ElectricalKind::Output => "output",
            ElectricalKind::Bidirectional => "BiDi",
            ElectricalKind::Tristate => "3state",
            ElectricalKind::Passive => "passive",
            ElectricalKind::Unspecified => "unspc",
            ElectricalKind::PowerIn => "power_in",
            ElectricalKind::PowerOut => "power_out",
            ElectricalKind::OpenCollector => "openCol",
            ElectricalKind::OpenEmitter => "openEm",
            ElectricalKind::NotConnected => "NotConnected",
        }
    }

    pub fn is_power(self) -> bool {
        matches!(self, ElectricalKind::PowerIn | ElectricalKind::PowerOut)
    }
}

impl std::fmt::Display for ElectricalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Pin position and orientation in the symbol drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PinAt {
    pub x: f64,
    pub y: f64,
    /// `U`, `D`, `L` or `R`
    pub orientation: String,
}

/// One pin of a library symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinDescriptor {
    pub number: String,
    pub name: String,
    pub electrical_kind: ElectricalKind,
    pub at: PinAt,
    pub length: f64,
    pub name_text_size: f64,
    pub number_text_size: f64,
    pub unit: u32,
    pub convert: u32,
    /// Graphical style code, when present (`I` inverted, `C` clock, ...)
    pub style: Option<String>,
}

impl PinDescriptor {
    /// A pin with no drawing information, for parts built in code.
    pub fn new(number: impl Into<String>, name: impl Into<String>, kind: ElectricalKind) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            electrical_kind: kind,
            at: PinAt::default(),
            length: 0.0,
            name_text_size: 0.0,
            number_text_size: 0.0,
            unit: 0,
            convert: 0,
            style: None,
        }
    }
}

/// Documentation attached to a part, usually from a `.dcm` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Doc {
    pub name: String,
    pub description: String,
    pub usage: String,
    pub datasheet_url: String,
}

/// A drawing primitive kept as-is: the record tag and its raw arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    pub tag: String,
    pub args: Vec<String>,
}

/// A library part definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Symbol {
    /// Library the symbol was loaded from, empty until assigned
    pub library: String,
    pub name: String,
    /// Reference designator prefix (`R`, `U`, `#PWR`)
    pub reference: String,
    /// Default value field
    pub value: String,
    pub datasheet: Option<String>,
    pub footprint_filters: Vec<String>,
    pub aliases: Vec<String>,
    pub doc: Doc,
    pub shapes: Vec<Shape>,
    pub pins: Vec<PinDescriptor>,
}

impl Symbol {
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub fn description(&self) -> &str {
        &self.doc.description
    }
}
