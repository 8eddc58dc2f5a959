//! The design session: owner of every part, component, pin, net and board.
//!
//! Entities refer to each other through small `Copy` handles into the
//! session's arenas, so the pin/net/component cycle needs no shared
//! ownership. A pin's net and that net's member list are only changed
//! together, through [`Session::connect`] and friends.

use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::Regex;

use crate::board::{Block, Board};
use crate::catalog::Catalog;
use crate::component::{Component, ComponentSpec, CustomPinResolver, type_prefix};
use crate::config::TraceToml;
use crate::error::{CatalogError, GraphError, QueryError};
use crate::footprint::{self, AutoAssignmentMiss, FootprintMatcher};
use crate::net::{ConnectTarget, Net};
use crate::pin::{Pin, PinName, PinSelector};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position in the owning arena.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " #{}"), self.0)
            }
        }
    };
}

define_handle!(
    /// Handle to a [`Component`].
    ComponentId,
    "component"
);
define_handle!(
    /// Handle to a [`Pin`].
    PinId,
    "pin"
);
define_handle!(
    /// Handle to a [`Net`]. Stays valid after the net is destroyed, but
    /// lookups then fail with [`GraphError::DestroyedNet`].
    NetId,
    "net"
);
define_handle!(
    /// Handle to a [`crate::Part`] in the catalog.
    PartId,
    "part"
);
define_handle!(BoardId, "board");
define_handle!(
    /// Handle to a footprint in the catalog registry.
    FootprintId,
    "footprint"
);

/// One independent design.
#[derive(Default)]
pub struct Session {
    catalog: Catalog,
    components: Vec<Component>,
    pins: Vec<Pin>,
    nets: Vec<Option<Net>>,
    /// Names of live nets
    net_names: HashMap<String, NetId>,
    net_counter: usize,
    max_component_id: u32,
    boards: Vec<Board>,
    matcher: FootprintMatcher,
}

impl Session {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Session whose catalog searches the configured library paths, with
    /// the configured footprint directories already registered.
    pub fn from_config(config: &TraceToml) -> anyhow::Result<Self> {
        let mut catalog = Catalog::new(config.library_search_paths());
        catalog.set_power_library(config.libraries.power_library.clone());
        for dir in config.footprint_dirs() {
            if dir.is_dir() {
                catalog.load_footprints(&dir)?;
            } else {
                log::debug!("Footprint directory {} does not exist", dir.display());
            }
        }
        Ok(Self::new(catalog))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Shorthand for [`Catalog::part_id`].
    pub fn part(&mut self, library: &str, name: &str) -> Result<PartId, CatalogError> {
        self.catalog.part_id(library, name)
    }

    // Nets

    /// Create an empty net. Without a name one is generated as `Net_<n>`.
    pub fn add_net(&mut self, name: Option<&str>) -> Result<NetId, GraphError> {
        let name = match name {
            Some(name) if self.net_names.contains_key(name) => {
                return Err(GraphError::DuplicateNetName {
                    name: name.to_string(),
                });
            }
            Some(name) => name.to_string(),
            None => self.next_net_name(),
        };

        let id = NetId(self.nets.len());
        self.net_names.insert(name.clone(), id);
        self.nets.push(Some(Net::new(id, name)));
        Ok(id)
    }

    fn next_net_name(&mut self) -> String {
        loop {
            self.net_counter += 1;
            let name = format!("Net_{}", self.net_counter);
            if !self.net_names.contains_key(&name) {
                return name;
            }
        }
    }

    pub fn net(&self, id: NetId) -> Result<&Net, GraphError> {
        self.nets
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(GraphError::DestroyedNet { net: id })
    }

    pub(crate) fn net_mut(&mut self, id: NetId) -> Result<&mut Net, GraphError> {
        self.nets
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(GraphError::DestroyedNet { net: id })
    }

    /// Live nets in creation order.
    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.iter().flatten()
    }

    /// Move every pin of `src` to the end of `target`, in order. `src` is
    /// left empty but alive.
    pub fn raid_net(&mut self, src: NetId, target: NetId) -> Result<(), GraphError> {
        self.net(target)?;
        if src == target {
            return Ok(());
        }
        let moved = std::mem::take(&mut self.net_mut(src)?.pins);
        for &pin in &moved {
            self.pins[pin.0].net = Some(target);
        }
        log::trace!("Raided {} pins from {src} into {target}", moved.len());
        self.net_mut(target)?.pins.extend(moved);
        Ok(())
    }

    /// Raid `src` into `target`, then destroy `src`.
    pub fn merge_nets(&mut self, src: NetId, target: NetId) -> Result<(), GraphError> {
        if src == target {
            return self.net(src).map(|_| ());
        }
        self.raid_net(src, target)?;
        self.destroy_net(src)
    }

    /// Remove a net, detaching any pins still on it. Its name becomes free.
    pub fn destroy_net(&mut self, id: NetId) -> Result<(), GraphError> {
        let net = self
            .nets
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(GraphError::DestroyedNet { net: id })?;
        for pin in net.pins {
            self.pins[pin.0].net = None;
        }
        self.net_names.remove(&net.name);
        Ok(())
    }

    /// Connect `pin` to a net or to another pin, merging nets as needed.
    /// Returns the net the pin ends up on.
    ///
    /// When two nets meet, the one `pin` was on is raided into the other and
    /// destroyed.
    pub fn connect(
        &mut self,
        pin: PinId,
        target: impl Into<ConnectTarget>,
    ) -> Result<NetId, GraphError> {
        match target.into() {
            ConnectTarget::Net(net) => {
                self.net(net)?;
                match self.pins[pin.0].net {
                    Some(current) if current == net => {}
                    Some(current) => self.merge_nets(current, net)?,
                    None => self.attach(pin, net)?,
                }
                Ok(net)
            }
            ConnectTarget::Pin(other) => match (self.pins[pin.0].net, self.pins[other.0].net) {
                (Some(a), Some(b)) => {
                    self.merge_nets(a, b)?;
                    Ok(b)
                }
                (Some(a), None) => {
                    self.attach(other, a)?;
                    Ok(a)
                }
                (None, Some(b)) => {
                    self.attach(pin, b)?;
                    Ok(b)
                }
                (None, None) => {
                    let net = self.add_net(None)?;
                    self.attach(pin, net)?;
                    if other != pin {
                        self.attach(other, net)?;
                    }
                    Ok(net)
                }
            },
        }
    }

    fn attach(&mut self, pin: PinId, net: NetId) -> Result<(), GraphError> {
        self.net_mut(net)?.pins.push(pin);
        self.pins[pin.0].net = Some(net);
        Ok(())
    }

    // Components and pins

    /// Build a component from `spec`.
    ///
    /// The reference is the explicit one, or prefix + id where the prefix is
    /// the explicit one, the part's reference field, or the part name up to
    /// its first `_`. Connections are checked before anything is created.
    pub fn add_component(&mut self, spec: ComponentSpec) -> Result<ComponentId, GraphError> {
        let part = self.catalog.part(spec.part);

        let prefix = spec.prefix.clone().unwrap_or_else(|| {
            let reference = part.symbol.reference.trim_matches('"');
            if reference.is_empty() {
                type_prefix(part.name()).to_string()
            } else {
                reference.to_string()
            }
        });
        let number = spec.id.unwrap_or(self.max_component_id + 1);
        let reference = spec
            .reference
            .clone()
            .unwrap_or_else(|| format!("{prefix}{number}"));
        if self.components.iter().any(|c| c.reference == reference) {
            return Err(GraphError::DuplicateReference { reference });
        }

        let id = ComponentId(self.components.len());
        let first_pin = self.pins.len();
        let pins = part
            .symbol
            .pins
            .iter()
            .enumerate()
            .map(|(i, desc)| -> Result<Pin, GraphError> {
                let name = PinName::parse(&desc.name).map_err(|source| {
                    CatalogError::MalformedPinName {
                        part: part.identifier.clone(),
                        source,
                    }
                })?;
                Ok(Pin {
                    id: PinId(first_pin + i),
                    component: id,
                    number: desc.number.clone(),
                    name,
                    kind: desc.electrical_kind,
                    net: None,
                    error: false,
                })
            })
            .collect::<Result<Vec<_>, GraphError>>()?;

        // Resolve every connection before committing anything
        let pin_refs: Vec<&Pin> = pins.iter().collect();
        let mut wiring = Vec::with_capacity(spec.connections.len());
        for (selector, target) in &spec.connections {
            let matched = select_pins(&pin_refs, part.resolver(), selector);
            let pin = QueryError::exactly_one(&matched, "pin", &selector.to_string()).map_err(
                |source| GraphError::Pin {
                    component: reference.clone(),
                    source,
                },
            )?;
            if let ConnectTarget::Net(net) = target {
                self.net(*net)?;
            }
            wiring.push((pin, *target));
        }
        self.check_wiring(&wiring)?;

        let footprint = spec.footprint.or(part.default_footprint);
        let pin_ids = pins.iter().map(|p| p.id).collect();
        log::debug!("Adding {reference} ({})", part.identifier);

        self.pins.extend(pins);
        self.components.push(Component {
            id,
            part: spec.part,
            prefix,
            number,
            reference,
            pins: pin_ids,
            value: spec.value,
            footprint,
            board: None,
            error: false,
        });
        self.max_component_id = self.max_component_id.max(number);

        for (pin, target) in wiring {
            self.connect(pin, target)?;
        }
        Ok(id)
    }

    /// Replay `wiring` without touching the graph. Fails on the first
    /// connection to a net that an earlier one in the list would destroy.
    fn check_wiring(&self, wiring: &[(PinId, ConnectTarget)]) -> Result<(), GraphError> {
        let mut pin_nets: HashMap<PinId, NetId> = HashMap::new();
        let mut merged: HashMap<NetId, NetId> = HashMap::new();
        let mut next_net = self.nets.len();

        let net_of = |pin_nets: &HashMap<PinId, NetId>, merged: &HashMap<NetId, NetId>, pin: PinId| {
            pin_nets
                .get(&pin)
                .copied()
                .or_else(|| self.pins.get(pin.0).and_then(|p| p.net))
                .map(|net| survivor(merged, net))
        };

        for &(pin, target) in wiring {
            let current = net_of(&pin_nets, &merged, pin);
            match target {
                ConnectTarget::Net(net) => {
                    if merged.contains_key(&net) {
                        return Err(GraphError::DestroyedNet { net });
                    }
                    if let Some(current) = current.filter(|&c| c != net) {
                        merged.insert(current, net);
                    }
                    pin_nets.insert(pin, net);
                }
                ConnectTarget::Pin(other) => match (current, net_of(&pin_nets, &merged, other)) {
                    (Some(a), Some(b)) if a != b => {
                        merged.insert(a, b);
                    }
                    (Some(_), Some(_)) => {}
                    (Some(a), None) => {
                        pin_nets.insert(other, a);
                    }
                    (None, Some(b)) => {
                        pin_nets.insert(pin, b);
                    }
                    (None, None) => {
                        let net = NetId(next_net);
                        next_net += 1;
                        pin_nets.insert(pin, net);
                        pin_nets.insert(other, net);
                    }
                },
            }
        }
        Ok(())
    }

    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.0]
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> &mut Component {
        &mut self.components[id.0]
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Manually assign a footprint; auto-assignment leaves it alone.
    pub fn set_footprint(&mut self, component: ComponentId, footprint: FootprintId) {
        self.components[component.0].footprint = Some(footprint);
    }

    pub fn set_value(&mut self, component: ComponentId, value: impl Into<String>) {
        self.components[component.0].value = Some(value.into());
    }

    pub fn get_pin(&self, id: PinId) -> &Pin {
        &self.pins[id.0]
    }

    pub(crate) fn pin_mut(&mut self, id: PinId) -> &mut Pin {
        &mut self.pins[id.0]
    }

    /// The single pin of `component` matching `selector`.
    pub fn pin(
        &self,
        component: ComponentId,
        selector: impl Into<PinSelector>,
    ) -> Result<PinId, QueryError> {
        let selector = selector.into();
        let matched = self.pins(component, selector.clone());
        QueryError::exactly_one(&matched, "pin", &selector.to_string())
    }

    /// Every pin of `component` matching `selector`, in pin order followed
    /// by any extra pins the part's resolver adds.
    pub fn pins(&self, component: ComponentId, selector: impl Into<PinSelector>) -> Vec<PinId> {
        let component = self.component(component);
        let pins: Vec<&Pin> = component.pins.iter().map(|p| &self.pins[p.0]).collect();
        let resolver = self.catalog.part(component.part).resolver();
        select_pins(&pins, resolver, &selector.into())
    }

    /// Reference and pin number for display, e.g. `U1.3`.
    pub fn pin_label(&self, id: PinId) -> String {
        let pin = self.get_pin(id);
        format!("{}.{}", self.component(pin.component).reference, pin.number)
    }

    // Lookup

    pub fn find_nets(&self, pattern: &str) -> Result<Vec<NetId>, QueryError> {
        let re = compile(pattern)?;
        Ok(self
            .nets()
            .filter(|n| re.is_match(&n.name))
            .map(|n| n.id)
            .collect())
    }

    pub fn find_net(&self, pattern: &str) -> Result<NetId, QueryError> {
        QueryError::exactly_one(&self.find_nets(pattern)?, "net", pattern)
    }

    pub fn find_components(&self, pattern: &str) -> Result<Vec<ComponentId>, QueryError> {
        let re = compile(pattern)?;
        Ok(self
            .components
            .iter()
            .filter(|c| re.is_match(&c.reference))
            .map(|c| c.id)
            .collect())
    }

    pub fn find_component(&self, pattern: &str) -> Result<ComponentId, QueryError> {
        QueryError::exactly_one(&self.find_components(pattern)?, "component", pattern)
    }

    // Boards

    /// Collect the components reachable from `root` into a new board, in
    /// visit order and without duplicates.
    pub fn add_board(&mut self, name: impl Into<String>, root: &dyn Block) -> BoardId {
        let id = BoardId(self.boards.len());
        let mut seen = HashSet::new();
        let mut components = Vec::new();
        root.visit(&mut |c| {
            if seen.insert(c) {
                components.push(c);
            }
        });

        for &c in &components {
            self.components[c.0].board = Some(id);
        }
        let board = Board {
            id,
            name: name.into(),
            components,
        };
        log::debug!("Board {} has {} components", board.name, board.components.len());
        self.boards.push(board);
        id
    }

    pub fn board(&self, id: BoardId) -> &Board {
        &self.boards[id.0]
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    /// Live nets with at least one pin on the board, in creation order.
    pub fn board_nets(&self, board: BoardId) -> Vec<NetId> {
        let members: HashSet<ComponentId> = self.board(board).components.iter().copied().collect();
        self.nets()
            .filter(|net| {
                net.pins
                    .iter()
                    .any(|p| members.contains(&self.pins[p.0].component))
            })
            .map(|net| net.id)
            .collect()
    }

    // Footprints

    /// Footprint candidates for `part`, computed on first request.
    pub fn candidates(&mut self, part: PartId) -> &[FootprintId] {
        self.matcher.candidates(&self.catalog, part)
    }

    /// See [`footprint::auto_assign`].
    pub fn auto_assign_footprints(&mut self, components: &[ComponentId]) -> Vec<AutoAssignmentMiss> {
        footprint::auto_assign(self, components)
    }
}

/// Follow merges from `net` to the net that absorbed it.
fn survivor(merged: &HashMap<NetId, NetId>, mut net: NetId) -> NetId {
    while let Some(&into) = merged.get(&net) {
        net = into;
    }
    net
}

fn select_pins(
    pins: &[&Pin],
    resolver: Option<&dyn CustomPinResolver>,
    selector: &PinSelector,
) -> Vec<PinId> {
    let mut found: Vec<PinId> = pins
        .iter()
        .filter(|p| selector.matches(p))
        .map(|p| p.id)
        .collect();
    if let Some(resolver) = resolver {
        for extra in resolver.resolve(pins, selector) {
            if pins.iter().any(|p| p.id == extra) && !found.contains(&extra) {
                found.push(extra);
            }
        }
    }
    found
}

fn compile(pattern: &str) -> Result<Regex, QueryError> {
    Regex::new(pattern).map_err(|source| QueryError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::UserPart;
    use trace_eda::{ElectricalKind, PinDescriptor, Symbol};

    fn two_pin_part(session: &mut Session, name: &str, reference: &str) -> PartId {
        let symbol = Symbol {
            name: name.into(),
            reference: reference.into(),
            pins: vec![
                PinDescriptor::new("1", "A", ElectricalKind::Passive),
                PinDescriptor::new("2", "B", ElectricalKind::Passive),
            ],
            ..Symbol::default()
        };
        session.catalog_mut().register_part(UserPart::new(symbol)).unwrap()
    }

    fn pins_of(session: &Session, net: NetId) -> Vec<PinId> {
        session.net(net).unwrap().pins().to_vec()
    }

    fn assert_consistent(session: &Session) {
        for net in session.nets() {
            for &p in net.pins() {
                assert_eq!(session.get_pin(p).net(), Some(net.id));
            }
        }
        for pin in &session.pins {
            if let Some(net) = pin.net() {
                assert!(session.net(net).unwrap().pins().contains(&pin.id));
            }
        }
    }

    #[test]
    fn chained_connections_share_one_net() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "X");
        let c = s.add_component(ComponentSpec::new(part)).unwrap();
        let d = s.add_component(ComponentSpec::new(part)).unwrap();
        let (a, b) = (s.pin(c, "A").unwrap(), s.pin(c, "B").unwrap());
        let cc = s.pin(d, "A").unwrap();

        let net = s.connect(a, b).unwrap();
        assert_eq!(s.connect(cc, b).unwrap(), net);
        assert_eq!(pins_of(&s, net), [a, b, cc]);
        assert_eq!(s.nets().count(), 1);
        assert_consistent(&s);
    }

    #[test]
    fn joining_two_nets_destroys_one() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "X");
        let c = s.add_component(ComponentSpec::new(part)).unwrap();
        let d = s.add_component(ComponentSpec::new(part)).unwrap();
        let (a, b) = (s.pin(c, "A").unwrap(), s.pin(c, "B").unwrap());
        let (pc, pd) = (s.pin(d, "A").unwrap(), s.pin(d, "B").unwrap());

        let ab = s.connect(a, b).unwrap();
        let cd = s.connect(pc, pd).unwrap();
        assert_eq!(s.connect(b, pc).unwrap(), cd);

        assert!(matches!(s.net(ab), Err(GraphError::DestroyedNet { .. })));
        assert_eq!(pins_of(&s, cd), [pc, pd, a, b]);
        assert_eq!(s.nets().count(), 1);
        assert_consistent(&s);
    }

    #[test]
    fn raid_empties_source() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "X");
        let c = s.add_component(ComponentSpec::new(part)).unwrap();
        let src = s.add_net(Some("SRC")).unwrap();
        let dst = s.add_net(Some("DST")).unwrap();
        for p in s.pins(c, PinSelector::Query(Default::default())) {
            s.connect(p, src).unwrap();
        }

        s.raid_net(src, dst).unwrap();
        assert!(s.net(src).unwrap().is_empty());
        assert_eq!(pins_of(&s, dst).len(), 2);
        for &p in s.net(dst).unwrap().pins() {
            assert_eq!(s.get_pin(p).net(), Some(dst));
        }
        assert_consistent(&s);
    }

    #[test]
    fn connecting_to_current_net_is_a_noop() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "X");
        let c = s.add_component(ComponentSpec::new(part)).unwrap();
        let gnd = s.add_net(Some("GND")).unwrap();
        let a = s.pin(c, 1u32).unwrap();
        s.connect(a, gnd).unwrap();
        s.connect(a, gnd).unwrap();
        s.connect(a, a).unwrap();
        assert_eq!(pins_of(&s, gnd), [a]);
    }

    #[test]
    fn destroy_detaches_and_frees_name() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "X");
        let c = s.add_component(ComponentSpec::new(part)).unwrap();
        let gnd = s.add_net(Some("GND")).unwrap();
        let a = s.pin(c, "A").unwrap();
        s.connect(a, gnd).unwrap();

        assert!(matches!(
            s.add_net(Some("GND")),
            Err(GraphError::DuplicateNetName { .. })
        ));
        s.destroy_net(gnd).unwrap();
        assert_eq!(s.get_pin(a).net(), None);
        assert!(s.destroy_net(gnd).is_err());
        assert!(s.add_net(Some("GND")).is_ok());
    }

    #[test]
    fn auto_names_skip_taken_names() {
        let mut s = Session::default();
        s.add_net(Some("Net_2")).unwrap();
        let first = s.add_net(None).unwrap();
        let second = s.add_net(None).unwrap();
        assert_eq!(s.net(first).unwrap().name, "Net_1");
        assert_eq!(s.net(second).unwrap().name, "Net_3");
    }

    #[test]
    fn references_and_prefixes() {
        let mut s = Session::default();
        let resistor = two_pin_part(&mut s, "R_US", "");
        let cap = two_pin_part(&mut s, "C", "\"C\"");

        let r = s.add_component(ComponentSpec::new(resistor)).unwrap();
        let c = s.add_component(ComponentSpec::new(cap)).unwrap();
        let x = s.add_component(ComponentSpec::new(cap).prefix("CX").id(10)).unwrap();
        let next = s.add_component(ComponentSpec::new(cap)).unwrap();

        assert_eq!(s.component(r).reference, "R1");
        assert_eq!(s.component(c).reference, "C2");
        assert_eq!(s.component(x).reference, "CX10");
        assert_eq!(s.component(next).reference, "C11");
    }

    #[test]
    fn default_ids_strictly_increase() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "X");
        let ids: Vec<u32> = (0..4)
            .map(|_| {
                let c = s.add_component(ComponentSpec::new(part).prefix("IC")).unwrap();
                s.component(c).number
            })
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(s.component(ComponentId(0)).reference, "IC1");
    }

    #[test]
    fn duplicate_reference_is_rejected() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "X");
        s.add_component(ComponentSpec::new(part).reference("U7")).unwrap();
        let err = s
            .add_component(ComponentSpec::new(part).reference("U7"))
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateReference { ref reference } if reference == "U7"));
        assert_eq!(s.components().len(), 1);
    }

    #[test]
    fn bad_connection_commits_nothing() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "X");
        let gnd = s.add_net(Some("GND")).unwrap();
        let err = s
            .add_component(ComponentSpec::new(part).connect("A", gnd).connect("Z", gnd))
            .unwrap_err();
        assert_eq!(err.to_string(), "component X1: no pin matches 'Z'");
        assert!(s.components().is_empty());
        assert!(s.net(gnd).unwrap().is_empty());

        let ok = s
            .add_component(ComponentSpec::new(part).connect("A", gnd))
            .unwrap();
        assert_eq!(s.component(ok).reference, "X1");
        assert_eq!(pins_of(&s, gnd), [s.pin(ok, "A").unwrap()]);
    }

    #[test]
    fn connection_to_a_net_merged_away_commits_nothing() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "X");
        let one = s.add_net(Some("ONE")).unwrap();
        let two = s.add_net(Some("TWO")).unwrap();

        // A joins ONE, moving to TWO merges ONE away, so B has nowhere to go
        let err = s
            .add_component(
                ComponentSpec::new(part)
                    .connect("A", one)
                    .connect("A", two)
                    .connect("B", one),
            )
            .unwrap_err();
        assert!(matches!(err, GraphError::DestroyedNet { net } if net == one));
        assert!(s.components().is_empty());
        assert!(s.net(one).unwrap().is_empty());
        assert!(s.net(two).unwrap().is_empty());

        let x = s
            .add_component(ComponentSpec::new(part).connect("A", one).connect("A", two))
            .unwrap();
        assert!(s.net(one).is_err());
        assert_eq!(pins_of(&s, two), [s.pin(x, "A").unwrap()]);
    }

    #[test]
    fn lookups_by_pattern() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "U");
        s.add_component(ComponentSpec::new(part)).unwrap();
        s.add_component(ComponentSpec::new(part)).unwrap();
        s.add_net(Some("VCC")).unwrap();
        s.add_net(Some("GND")).unwrap();
        s.add_net(Some("AGND")).unwrap();

        assert_eq!(s.find_components("^U").unwrap().len(), 2);
        assert!(matches!(
            s.find_component("^U"),
            Err(QueryError::Ambiguous { count: 2, .. })
        ));
        assert!(s.find_net("^GND$").is_ok());
        assert!(matches!(s.find_net("GND"), Err(QueryError::Ambiguous { .. })));
        assert!(matches!(s.find_net("5V"), Err(QueryError::NotFound { .. })));
    }

    #[test]
    fn boards_flatten_blocks_once() {
        let mut s = Session::default();
        let part = two_pin_part(&mut s, "X", "X");
        let a = s.add_component(ComponentSpec::new(part)).unwrap();
        let b = s.add_component(ComponentSpec::new(part)).unwrap();
        let lone = s.add_component(ComponentSpec::new(part)).unwrap();
        let pa = s.pin(a, "A").unwrap();
        let pb = s.pin(b, "A").unwrap();
        let plone = s.pin(lone, "A").unwrap();
        let shared = s.connect(pa, pb).unwrap();
        s.connect(plone, s.pin(lone, "B").unwrap()).unwrap();

        let board = s.add_board("main", &vec![a, b, a]);
        assert_eq!(s.board(board).components(), [a, b]);
        assert_eq!(s.component(a).board(), Some(board));
        assert_eq!(s.component(lone).board(), None);
        assert_eq!(s.board_nets(board), [shared]);
    }
}
