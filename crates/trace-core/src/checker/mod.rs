//! Design rule checks over components and nets.

mod erc;

pub use erc::{ErcChecker, ErcViolation};

use crate::session::{BoardId, ComponentId, NetId, PinId, Session};

/// Outcome of checking one component or net.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub passed: bool,
    pub message: String,
    /// Pins to highlight when the check failed
    pub offenders: Vec<PinId>,
}

impl Report {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            offenders: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            offenders: Vec::new(),
        }
    }

    pub fn with_offenders(mut self, pins: impl IntoIterator<Item = PinId>) -> Self {
        self.offenders.extend(pins);
        self
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::ok("")
    }
}

/// A rule evaluated against every component and every net. Both hooks pass
/// by default so a checker only implements what it inspects.
pub trait Checker {
    fn name(&self) -> &str;

    fn check_component(&self, _session: &Session, _component: ComponentId) -> Report {
        Report::default()
    }

    fn check_net(&self, _session: &Session, _net: NetId) -> Report {
        Report::default()
    }
}

/// Result of a full run.
#[derive(Debug, Clone, Default)]
pub struct CheckSummary {
    /// True when every report passed
    pub passed: bool,
    pub reports: Vec<Report>,
}

impl CheckSummary {
    pub fn failures(&self) -> impl Iterator<Item = &Report> {
        self.reports.iter().filter(|r| !r.passed)
    }
}

/// Runs a list of checkers and records results on the checked entities.
#[derive(Default)]
pub struct CheckerEngine {
    checkers: Vec<Box<dyn Checker>>,
}

impl CheckerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the built-in electrical rule checker.
    pub fn with_erc() -> Self {
        let mut engine = Self::new();
        engine.add(ErcChecker);
        engine
    }

    pub fn add(&mut self, checker: impl Checker + 'static) -> &mut Self {
        self.checkers.push(Box::new(checker));
        self
    }

    /// Check every component, then every live net, with each checker.
    ///
    /// Error flags in scope are cleared first, then set by any failing
    /// report from any checker.
    pub fn run(&self, session: &mut Session) -> CheckSummary {
        let components: Vec<ComponentId> = session.components().iter().map(|c| c.id).collect();
        let nets: Vec<NetId> = session.nets().map(|n| n.id).collect();
        self.run_over(session, &components, &nets)
    }

    /// Check the board's components and the nets touching them.
    pub fn run_board(&self, session: &mut Session, board: BoardId) -> CheckSummary {
        let components = session.board(board).components().to_vec();
        let nets = session.board_nets(board);
        self.run_over(session, &components, &nets)
    }

    fn run_over(
        &self,
        session: &mut Session,
        components: &[ComponentId],
        nets: &[NetId],
    ) -> CheckSummary {
        for &c in components {
            session.component_mut(c).error = false;
            for pin in session.component(c).pins().to_vec() {
                session.pin_mut(pin).error = false;
            }
        }
        for &n in nets {
            if let Ok(net) = session.net_mut(n) {
                net.error = false;
            }
        }

        let mut summary = CheckSummary {
            passed: true,
            reports: Vec::new(),
        };
        for checker in &self.checkers {
            log::debug!("Running {}", checker.name());
            for &c in components {
                let report = checker.check_component(session, c);
                session.component_mut(c).error |= !report.passed;
                record(session, &mut summary, report);
            }
            for &n in nets {
                let report = checker.check_net(session, n);
                if let Ok(net) = session.net_mut(n) {
                    net.error |= !report.passed;
                }
                record(session, &mut summary, report);
            }
        }
        summary
    }
}

fn record(session: &mut Session, summary: &mut CheckSummary, report: Report) {
    if report.passed {
        if !report.message.is_empty() {
            log::info!("{}", report.message);
        }
    } else {
        log::error!("{}", report.message);
        for &pin in &report.offenders {
            session.pin_mut(pin).error = true;
            let owner = session.get_pin(pin).component;
            session.component_mut(owner).error = true;
        }
        summary.passed = false;
    }
    summary.reports.push(report);
}
