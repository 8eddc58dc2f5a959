//! Component instances and how they are described before construction.

use crate::net::ConnectTarget;
use crate::pin::{Pin, PinSelector};
use crate::session::{BoardId, ComponentId, FootprintId, PartId, PinId};

/// A placed instance of a part.
#[derive(Debug, Clone)]
pub struct Component {
    pub id: ComponentId,
    pub part: PartId,
    pub prefix: String,
    /// Numeric id used to build the reference
    pub number: u32,
    pub reference: String,
    pub(crate) pins: Vec<PinId>,
    pub value: Option<String>,
    pub footprint: Option<FootprintId>,
    pub(crate) board: Option<BoardId>,
    pub error: bool,
}

impl Component {
    /// Pins in library order.
    pub fn pins(&self) -> &[PinId] {
        &self.pins
    }

    pub fn board(&self) -> Option<BoardId> {
        self.board
    }
}

/// Part-level hook for pin lookups that the pin table alone cannot answer,
/// such as alternate names for the same pin.
pub trait CustomPinResolver {
    /// Extra pins matching `selector`, chosen from the component's `pins`.
    fn resolve(&self, pins: &[&Pin], selector: &PinSelector) -> Vec<PinId>;
}

/// Everything needed to construct a component.
///
/// ```
/// use trace_core::{ComponentSpec, PartId};
///
/// # fn demo(part: PartId) -> ComponentSpec {
/// ComponentSpec::new(part).value("10k").prefix("RX")
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    pub part: PartId,
    pub reference: Option<String>,
    pub prefix: Option<String>,
    pub id: Option<u32>,
    pub value: Option<String>,
    pub footprint: Option<FootprintId>,
    pub connections: Vec<(PinSelector, ConnectTarget)>,
}

impl ComponentSpec {
    pub fn new(part: PartId) -> Self {
        Self {
            part,
            reference: None,
            prefix: None,
            id: None,
            value: None,
            footprint: None,
            connections: Vec::new(),
        }
    }

    /// Use `reference` verbatim instead of prefix + id.
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn footprint(mut self, footprint: FootprintId) -> Self {
        self.footprint = Some(footprint);
        self
    }

    /// Wire a pin of the new component as part of construction.
    pub fn connect(mut self, pin: impl Into<PinSelector>, target: impl Into<ConnectTarget>) -> Self {
        self.connections.push((pin.into(), target.into()));
        self
    }
}

/// Prefix derived from a part name: the text before the first `_`.
pub(crate) fn type_prefix(part_name: &str) -> &str {
    part_name.split('_').next().unwrap_or(part_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_prefix_takes_first_segment() {
        assert_eq!(type_prefix("R_US"), "R");
        assert_eq!(type_prefix("Q_PNP_EBC"), "Q");
        assert_eq!(type_prefix("NE555D"), "NE555D");
        assert_eq!(type_prefix(""), "");
    }
}
