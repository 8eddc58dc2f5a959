//! KiCad netlist (`export` version D) and footprint emission.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use trace_sexpr::{Atom, Statement};

use crate::config::TraceToml;
use crate::session::{BoardId, ComponentId, NetId, PartId, Session};

/// Header fields of a generated netlist.
#[derive(Debug, Clone)]
pub struct NetlistOptions {
    pub source: String,
    pub date: String,
    pub tool: String,
    /// First component timestamp; each following component adds one
    pub timestamp_base: u64,
}

impl Default for NetlistOptions {
    fn default() -> Self {
        let now = chrono::Local::now();
        Self {
            source: String::new(),
            date: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            tool: format!("Trace netlist generator v{}", env!("CARGO_PKG_VERSION")),
            timestamp_base: now.timestamp().max(0) as u64,
        }
    }
}

impl NetlistOptions {
    /// Defaults, with the tool name from `[netlist]` when one is configured.
    pub fn from_config(config: &TraceToml) -> Self {
        let mut options = Self::default();
        if let Some(tool) = &config.netlist.tool {
            options.tool = tool.clone();
        }
        options
    }
}

/// Netlist of every component and live net in the session.
pub fn design_netlist(session: &Session, options: &NetlistOptions) -> Statement {
    let components: Vec<ComponentId> = session.components().iter().map(|c| c.id).collect();
    let nets: Vec<NetId> = session.nets().map(|n| n.id).collect();
    build(session, &components, &nets, options)
}

/// Netlist of one board. Nets only list the board's pins.
pub fn board_netlist(session: &Session, board: BoardId, options: &NetlistOptions) -> Statement {
    let components = session.board(board).components();
    let nets = session.board_nets(board);
    build(session, components, &nets, options)
}

/// Print the board netlist to `path`.
pub fn write_board_netlist(
    session: &Session,
    board: BoardId,
    path: &Path,
    options: &NetlistOptions,
) -> Result<()> {
    let text = trace_sexpr::printer::print(&board_netlist(session, board, options));
    fs::write(path, text)
        .with_context(|| format!("Failed to write netlist {}", path.display()))?;
    log::info!(
        "Wrote netlist for board {} to {}",
        session.board(board).name,
        path.display()
    );
    Ok(())
}

/// The `(module ...)` statement for a component's footprint, if it has one.
pub fn component_footprint(session: &Session, component: ComponentId) -> Option<Statement> {
    let footprint = session.component(component).footprint?;
    Some(session.catalog().footprint(footprint).to_statement())
}

fn build(
    session: &Session,
    components: &[ComponentId],
    nets: &[NetId],
    options: &NetlistOptions,
) -> Statement {
    let design = Statement::new("design")
        .with(Statement::kv("source", options.source.as_str()))
        .with(Statement::kv("date", Atom::string(&options.date)))
        .with(Statement::kv("tool", Atom::string(&options.tool)));

    let mut comps = Statement::new("components");
    let mut parts: Vec<PartId> = Vec::new();
    for (i, &id) in components.iter().enumerate() {
        let component = session.component(id);
        if !parts.contains(&component.part) {
            parts.push(component.part);
        }
        comps.add_argument(comp(session, id, options.timestamp_base + i as u64));
    }

    let libparts = Statement::new("libparts").with_all(parts.iter().map(|&p| libpart(session, p)));

    let members: HashSet<ComponentId> = components.iter().copied().collect();
    let net_list = Statement::new("nets").with_all(nets.iter().enumerate().filter_map(|(i, &n)| {
        let net = session.net(n).ok()?;
        let nodes = net.pins().iter().filter_map(|&p| {
            let pin = session.get_pin(p);
            members.contains(&pin.component).then(|| {
                Statement::new("node")
                    .with(Statement::kv(
                        "ref",
                        session.component(pin.component).reference.as_str(),
                    ))
                    .with(Statement::kv("pin", pin.number.as_str()))
            })
        });
        Some(
            Statement::new("net")
                .with(Statement::kv("code", i + 1))
                .with(Statement::kv("name", Atom::string(&net.name)))
                .with_all(nodes),
        )
    }));

    log::debug!(
        "Netlist with {} components, {} parts, {} nets",
        components.len(),
        parts.len(),
        nets.len()
    );
    Statement::new("export")
        .with(Statement::kv("version", Atom::string("D")))
        .with(design)
        .with(comps)
        .with(libparts)
        .with(net_list)
}

fn comp(session: &Session, id: ComponentId, timestamp: u64) -> Statement {
    let component = session.component(id);
    let part = session.catalog().part(component.part);

    let mut stmt = Statement::new("comp").with(Statement::kv("ref", component.reference.as_str()));
    let value = component
        .value
        .as_deref()
        .or((!part.symbol.value.is_empty()).then_some(part.symbol.value.as_str()));
    if let Some(value) = value {
        stmt.add_argument(Statement::kv("value", value));
    }
    if let Some(fp) = component.footprint {
        stmt.add_argument(Statement::kv(
            "footprint",
            session.catalog().footprint(fp).qualified_name(),
        ));
    }
    stmt.with(
        Statement::new("libsource")
            .with(Statement::kv("lib", part.library()))
            .with(Statement::kv("part", part.name()))
            .with(Statement::kv("description", Atom::string(part.symbol.description()))),
    )
    .with(Statement::kv("tstamp", format!("{timestamp:X}")))
}

fn libpart(session: &Session, id: PartId) -> Statement {
    let part = session.catalog().part(id);
    let footprints = Statement::new("footprints").with_all(
        part.symbol
            .footprint_filters
            .iter()
            .map(|f| Statement::kv("fp", f.as_str())),
    );
    let pins = Statement::new("pins").with_all(part.symbol.pins.iter().map(|pin| {
        Statement::new("pin")
            .with(Statement::kv("num", pin.number.as_str()))
            .with(Statement::kv("name", pin.name.as_str()))
            .with(Statement::kv("type", pin.electrical_kind.netlist_type()))
    }));

    Statement::new("libpart")
        .with(Statement::kv("lib", part.library()))
        .with(Statement::kv("part", part.name()))
        .with(Statement::kv("description", Atom::string(part.symbol.description())))
        .with(footprints)
        .with(Statement::new("fields"))
        .with(pins)
}
