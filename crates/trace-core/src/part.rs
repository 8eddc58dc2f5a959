use std::collections::HashSet;
use std::fmt;

use trace_eda::{Footprint, Symbol};

use crate::component::CustomPinResolver;
use crate::session::{FootprintId, PartId};

/// A part that components can be built from: a library symbol plus the
/// capabilities attached to it.
pub struct Part {
    pub id: PartId,
    /// Unique, filesystem-safe name for the part across all libraries
    pub identifier: String,
    pub symbol: Symbol,
    /// Footprint every instance starts with, for parts that generate one
    pub default_footprint: Option<FootprintId>,
    pub(crate) resolver: Option<Box<dyn CustomPinResolver>>,
}

impl Part {
    pub fn library(&self) -> &str {
        &self.symbol.library
    }

    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    /// Number of distinct pin numbers, the figure footprints are matched on.
    pub fn pin_count(&self) -> usize {
        self.symbol
            .pins
            .iter()
            .map(|p| p.number.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn resolver(&self) -> Option<&dyn CustomPinResolver> {
        self.resolver.as_deref()
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("id", &self.id)
            .field("identifier", &self.identifier)
            .field("library", &self.symbol.library)
            .field("name", &self.symbol.name)
            .field("pins", &self.symbol.pins.len())
            .field("default_footprint", &self.default_footprint)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// A part defined in code rather than loaded from a library file.
pub struct UserPart {
    pub symbol: Symbol,
    pub footprint: Option<Footprint>,
    pub resolver: Option<Box<dyn CustomPinResolver>>,
}

impl UserPart {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            footprint: None,
            resolver: None,
        }
    }

    /// Give every instance this generated footprint.
    pub fn footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = Some(footprint);
        self
    }

    pub fn resolver(mut self, resolver: impl CustomPinResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }
}

/// Map a part name to an identifier made of `[A-Za-z0-9_$]`, never starting
/// with a digit.
pub(crate) fn safe_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use trace_eda::{ElectricalKind, PinDescriptor};

    #[test]
    fn identifiers_are_filesystem_safe() {
        assert_eq!(safe_identifier("R_US"), "R_US");
        assert_eq!(safe_identifier("74LS00"), "_74LS00");
        assert_eq!(safe_identifier("+5V"), "_5V");
        assert_eq!(safe_identifier("SOIC-8 (narrow)"), "SOIC_8__narrow_");
        assert_eq!(safe_identifier(""), "_");
    }

    #[test]
    fn pin_count_ignores_repeated_numbers() {
        let mut symbol = Symbol::default();
        symbol.pins = vec![
            PinDescriptor::new("1", "A", ElectricalKind::Input),
            PinDescriptor::new("2", "B", ElectricalKind::Output),
            PinDescriptor::new("2", "~B", ElectricalKind::Output),
        ];
        let part = Part {
            id: PartId(0),
            identifier: "X".into(),
            symbol,
            default_footprint: None,
            resolver: None,
        };
        assert_eq!(part.pin_count(), 2);
    }
}
