use thiserror::Error;
use trace_eda::ElectricalKind;

use super::{Checker, Report};
use crate::session::{ComponentId, NetId, PinId, Session};

/// Electrical rule violations found by [`ErcChecker`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErcViolation {
    #[error("Multiple outputs connected to net")]
    MultipleDrivers { drivers: Vec<PinId> },

    #[error("Power connected to outputs")]
    PowerShort {
        outputs: Vec<PinId>,
        power: Vec<PinId>,
    },

    #[error("Missing power connection to component")]
    UnconnectedPower { pin: PinId },

    /// The pin's net has no power output and no power-library part on it
    #[error("Missing power connection to component")]
    NoPowerSource { pin: PinId },
}

impl ErcViolation {
    /// Pins responsible for the violation.
    pub fn pins(&self) -> Vec<PinId> {
        match self {
            ErcViolation::MultipleDrivers { drivers } => drivers.clone(),
            ErcViolation::PowerShort { outputs, power } => {
                outputs.iter().chain(power).copied().collect()
            }
            ErcViolation::UnconnectedPower { pin } | ErcViolation::NoPowerSource { pin } => {
                vec![*pin]
            }
        }
    }
}

/// Built-in electrical rule check: output contention and power wiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErcChecker;

impl ErcChecker {
    pub fn net_violations(&self, session: &Session, net: NetId) -> Vec<ErcViolation> {
        let Ok(net) = session.net(net) else {
            return Vec::new();
        };
        let mut outputs = Vec::new();
        let mut power = Vec::new();
        for &pin in net.pins() {
            match session.get_pin(pin).kind {
                ElectricalKind::Output => outputs.push(pin),
                kind if kind.is_power() => power.push(pin),
                _ => {}
            }
        }

        let mut violations = Vec::new();
        if outputs.len() > 1 {
            violations.push(ErcViolation::MultipleDrivers {
                drivers: outputs.clone(),
            });
        }
        if !outputs.is_empty() && !power.is_empty() {
            violations.push(ErcViolation::PowerShort { outputs, power });
        }
        violations
    }

    pub fn component_violations(
        &self,
        session: &Session,
        component: ComponentId,
    ) -> Vec<ErcViolation> {
        let component = session.component(component);
        let catalog = session.catalog();
        let is_source_part = catalog.is_power_part(component.part);

        let mut violations = Vec::new();
        for &id in component.pins() {
            let pin = session.get_pin(id);
            if pin.kind != ElectricalKind::PowerIn {
                continue;
            }
            let Some(net) = pin.net() else {
                violations.push(ErcViolation::UnconnectedPower { pin: id });
                continue;
            };
            if is_source_part {
                continue;
            }

            let members = session.net(net).map(|n| n.pins()).unwrap_or_default();
            let has_source = members.iter().filter(|&&other| other != id).any(|&other| {
                let other = session.get_pin(other);
                other.kind == ElectricalKind::PowerOut
                    || catalog.is_power_part(session.component(other.component).part)
            });
            if !has_source {
                violations.push(ErcViolation::NoPowerSource { pin: id });
            }
        }
        violations
    }
}

fn report(subject: &str, name: &str, violations: Vec<ErcViolation>) -> Report {
    if violations.is_empty() {
        return Report::ok(format!("{subject}: {name} passed ERC"));
    }

    let mut messages: Vec<String> = Vec::new();
    for v in &violations {
        let text = v.to_string();
        if !messages.contains(&text) {
            messages.push(text);
        }
    }
    Report::error(format!("{subject} {name} - {}", messages.join(", ")))
        .with_offenders(violations.iter().flat_map(ErcViolation::pins))
}

impl Checker for ErcChecker {
    fn name(&self) -> &str {
        "ERC"
    }

    fn check_component(&self, session: &Session, component: ComponentId) -> Report {
        let violations = self.component_violations(session, component);
        report("COMPONENT", &session.component(component).reference, violations)
    }

    fn check_net(&self, session: &Session, net: NetId) -> Report {
        let violations = self.net_violations(session, net);
        let name = session.net(net).map(|n| n.name.as_str()).unwrap_or("?");
        report("NET", name, violations)
    }
}
