//! Physical footprints: a named group of pads.
//!
//! Footprints read from `.kicad_mod` files only carry their pad count; pads
//! with geometry come from footprints built in code.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use trace_sexpr::Statement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PadType {
    ThroughHole,
    Smd,
    Connect,
    NpThroughHole,
}

impl PadType {
    pub fn token(self) -> &'static str {
        match self {
            PadType::ThroughHole => "thru_hole",
            PadType::Smd => "smd",
            PadType::Connect => "connect",
            PadType::NpThroughHole => "np_thru_hole",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PadShape {
    Circle,
    Rect,
    Oval,
    Trapezoid,
    RoundRect,
}

impl PadShape {
    pub fn token(self) -> &'static str {
        match self {
            PadShape::Circle => "circle",
            PadShape::Rect => "rect",
            PadShape::Oval => "oval",
            PadShape::Trapezoid => "trapezoid",
            PadShape::RoundRect => "roundrect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drill {
    pub size: f64,
    pub offset: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pad {
    pub name: String,
    pub pad_type: PadType,
    pub shape: PadShape,
    pub at: (f64, f64),
    pub angle: Option<f64>,
    pub size: (f64, f64),
    pub drill: Option<Drill>,
    pub layers: Vec<String>,
}

impl Pad {
    /// Round plated through-hole pad on all copper layers.
    pub fn through_hole(name: impl Into<String>, at: (f64, f64), diameter: f64, drill: f64) -> Self {
        Self {
            name: name.into(),
            pad_type: PadType::ThroughHole,
            shape: PadShape::Circle,
            at,
            angle: None,
            size: (diameter, diameter),
            drill: Some(Drill {
                size: drill,
                offset: None,
            }),
            layers: vec!["*.Cu".to_string(), "*.Mask".to_string()],
        }
    }

    pub fn to_statement(&self) -> Statement {
        let mut at = Statement::new("at").with(self.at.0).with(self.at.1);
        if let Some(angle) = self.angle {
            at.add_argument(angle);
        }

        let mut pad = Statement::new("pad")
            .with(self.name.as_str())
            .with(self.pad_type.token())
            .with(self.shape.token())
            .with(at)
            .with(Statement::new("size").with(self.size.0).with(self.size.1));

        if let Some(drill) = &self.drill {
            let mut stmt = Statement::kv("drill", drill.size);
            if let Some((x, y)) = drill.offset {
                stmt.add_argument(Statement::new("offset").with(x).with(y));
            }
            pad.add_argument(stmt);
        }
        pad
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footprint {
    /// Library the footprint belongs to, e.g. `Package_SO`
    pub group: String,
    pub name: String,
    pub pads: Vec<Pad>,
    pub pad_count: usize,
}

impl Footprint {
    pub fn new(group: impl Into<String>, name: impl Into<String>, pads: Vec<Pad>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            pad_count: pads.len(),
            pads,
        }
    }

    /// `group:name`, the form used in netlist footprint fields.
    pub fn qualified_name(&self) -> String {
        if self.group.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.group, self.name)
        }
    }

    /// Read a `.kicad_mod` file. The name is the file stem and the group is
    /// the parent directory without its extension (`Package_SO.pretty`).
    pub fn from_kicad_mod(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read footprint {}", path.display()))?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Footprint path has no file name: {}", path.display()))?;
        let group = path
            .parent()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        Ok(Self {
            group: group.to_string(),
            name: name.to_string(),
            pads: Vec::new(),
            pad_count: count_pads(&text),
        })
    }

    /// `(module <name> (layer F.Cu) (pad ...) ...)`
    pub fn to_statement(&self) -> Statement {
        Statement::new("module")
            .with(self.name.as_str())
            .with(Statement::kv("layer", "F.Cu"))
            .with_all(self.pads.iter().map(Pad::to_statement))
    }
}

/// Count pads in footprint source text by occurrences of `(pad`.
///
/// Text inside comments or strings is counted too.
pub fn count_pads(text: &str) -> usize {
    text.matches("(pad").count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOIC8: &str = r#"(module SOIC-8_3.9x4.9mm_P1.27mm (layer F.Cu)
  (pad 1 smd rect (at -2.475 -1.905) (size 1.95 0.6) (layers F.Cu F.Paste F.Mask))
  (pad 2 smd rect (at -2.475 -0.635) (size 1.95 0.6) (layers F.Cu F.Paste F.Mask))
  (pad 3 smd rect (at -2.475 0.635) (size 1.95 0.6) (layers F.Cu F.Paste F.Mask))
  (pad 4 smd rect (at -2.475 1.905) (size 1.95 0.6) (layers F.Cu F.Paste F.Mask))
  (pad 5 smd rect (at 2.475 1.905) (size 1.95 0.6) (layers F.Cu F.Paste F.Mask))
  (pad 6 smd rect (at 2.475 0.635) (size 1.95 0.6) (layers F.Cu F.Paste F.Mask))
  (pad 7 smd rect (at 2.475 -0.635) (size 1.95 0.6) (layers F.Cu F.Paste F.Mask))
  (pad 8 smd rect (at 2.475 -1.905) (size 1.95 0.6) (layers F.Cu F.Paste F.Mask))
)"#;

    #[test]
    fn counts_pad_occurrences() {
        assert_eq!(count_pads(SOIC8), 8);
        assert_eq!(count_pads("(module X (layer F.Cu))"), 0);
    }

    #[test]
    fn reads_kicad_mod_identity_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("Package_SO.pretty");
        std::fs::create_dir(&lib).unwrap();
        let path = lib.join("SOIC-8_3.9x4.9mm_P1.27mm.kicad_mod");
        std::fs::write(&path, SOIC8).unwrap();

        let fp = Footprint::from_kicad_mod(&path).unwrap();
        assert_eq!(fp.group, "Package_SO");
        assert_eq!(fp.name, "SOIC-8_3.9x4.9mm_P1.27mm");
        assert_eq!(fp.pad_count, 8);
        assert!(fp.pads.is_empty());
        assert_eq!(fp.qualified_name(), "Package_SO:SOIC-8_3.9x4.9mm_P1.27mm");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Footprint::from_kicad_mod(Path::new("/nonexistent/x.kicad_mod")).unwrap_err();
        assert!(err.to_string().contains("Failed to read footprint"));
    }

    #[test]
    fn emits_module_statement() {
        let mut pad = Pad::through_hole("1", (0.0, 0.0), 1.7, 1.0);
        pad.drill = Some(Drill {
            size: 1.0,
            offset: Some((0.1, 0.0)),
        });
        let mut smd = Pad::through_hole("2", (2.54, 0.0), 1.7, 1.0);
        smd.pad_type = PadType::Smd;
        smd.shape = PadShape::Rect;
        smd.angle = Some(90.0);
        smd.drill = None;

        let fp = Footprint::new("Generated", "PinHead_1x02", vec![pad, smd]);
        assert_eq!(fp.pad_count, 2);
        assert_eq!(
            fp.to_statement().to_string(),
            "(module PinHead_1x02 (layer F.Cu) \
             \n(pad 1 thru_hole circle \n(at 0 0) \n(size 1.7 1.7) \n(drill 1 \n(offset 0.1 0))) \
             \n(pad 2 smd rect \n(at 2.54 0 90) \n(size 1.7 1.7)))"
        );
    }
}
