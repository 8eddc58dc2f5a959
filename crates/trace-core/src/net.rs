use crate::session::{NetId, PinId};

/// A named set of pins at the same electrical node, in first-connection order.
#[derive(Debug, Clone)]
pub struct Net {
    pub id: NetId,
    pub name: String,
    pub(crate) pins: Vec<PinId>,
    pub error: bool,
}

impl Net {
    pub(crate) fn new(id: NetId, name: String) -> Self {
        Self {
            id,
            name,
            pins: Vec::new(),
            error: false,
        }
    }

    pub fn pins(&self) -> &[PinId] {
        &self.pins
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

/// The other end of a connection: an existing net or another pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectTarget {
    Net(NetId),
    Pin(PinId),
}

impl From<NetId> for ConnectTarget {
    fn from(net: NetId) -> Self {
        ConnectTarget::Net(net)
    }
}

impl From<PinId> for ConnectTarget {
    fn from(pin: PinId) -> Self {
        ConnectTarget::Pin(pin)
    }
}
