//! Code-first board design: parts come from a lazily loaded catalog,
//! components are instantiated into a [`Session`], pins are wired into nets,
//! and the result is checked and exported as a KiCad netlist.
//!
//! ```no_run
//! use trace_core::{CheckerEngine, ComponentSpec, Session, TraceToml};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = TraceToml::from_file("trace.toml".as_ref())?;
//! let mut session = Session::from_config(&config)?;
//!
//! let resistor = session.part("Device", "R_US")?;
//! let vcc = session.add_net(Some("VCC"))?;
//! let r1 = session.add_component(ComponentSpec::new(resistor).value("10k").connect(1u32, vcc))?;
//!
//! let board = session.add_board("main", &r1);
//! session.auto_assign_footprints(&[r1]);
//! let summary = CheckerEngine::with_erc().run_board(&mut session, board);
//! assert!(summary.passed);
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod catalog;
pub mod checker;
pub mod component;
pub mod config;
pub mod error;
pub mod footprint;
pub mod importer;
pub mod net;
pub mod netlist;
pub mod part;
pub mod pin;
pub mod session;

pub use board::{Block, Board};
pub use catalog::{Catalog, Library};
pub use checker::{CheckSummary, Checker, CheckerEngine, ErcChecker, ErcViolation, Report};
pub use component::{Component, ComponentSpec, CustomPinResolver};
pub use config::TraceToml;
pub use error::{CatalogError, GraphError, MalformedName, QueryError};
pub use footprint::{AutoAssignmentMiss, FootprintMatcher};
pub use importer::{Importer, KicadImporter};
pub use net::{ConnectTarget, Net};
pub use netlist::NetlistOptions;
pub use part::{Part, UserPart};
pub use pin::{Pin, PinName, PinQuery, PinSelector};
pub use session::{BoardId, ComponentId, FootprintId, NetId, PartId, PinId, Session};
