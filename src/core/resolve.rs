//! Counterpart search in the source model.
//!
//! Implementation operations on a component are matched to interface
//! operations by name suffix: `pStart_Start` implements `Start`. The scan
//! order is ports, then interfaces, then operations, all in model order, and
//! the first match wins.

use crate::config::toml_config::Conventions;
use crate::core::session::Transformer;
use crate::domain::ports::{SourceGraph, TargetGraph};
use crate::domain::source::{SourceId, SourceKind};

const RULE: &str = "resolve";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMatch {
    pub port: SourceId,
    pub operation: SourceId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Provided,
    Required,
}

fn interfaces_on<S: SourceGraph>(source: &S, port: SourceId, side: Side) -> Vec<SourceId> {
    match side {
        Side::Provided => source.provided_interfaces(port),
        Side::Required => source.required_interfaces(port),
    }
}

/// Every (port, interface operation) pair of the operation's owner whose
/// interface operation name is a suffix of `operation`'s name.
pub fn port_matches<S: SourceGraph>(source: &S, operation: SourceId, side: Side) -> Vec<PortMatch> {
    let Some(component) = source.owner(operation) else {
        return Vec::new();
    };
    let name = source.name(operation);
    let mut matches = Vec::new();
    for port in source.ports(component) {
        for interface in interfaces_on(source, port, side) {
            for candidate in source.operations(interface) {
                if name.ends_with(source.name(candidate)) {
                    matches.push(PortMatch {
                        port,
                        operation: candidate,
                    });
                }
            }
        }
    }
    matches
}

/// Component operations of `component` whose names end with `interface_operation`'s name.
pub fn implementation_matches<S: SourceGraph>(
    source: &S,
    component: SourceId,
    interface_operation: SourceId,
) -> Vec<SourceId> {
    let suffix = source.name(interface_operation);
    source
        .operations(component)
        .into_iter()
        .filter(|op| source.name(*op).ends_with(suffix))
        .collect()
}

/// «operationWevent» operation provided by one of `component`'s ports whose
/// `event` tag names `event`.
pub fn operation_with_event_on<S: SourceGraph>(
    source: &S,
    conventions: &Conventions,
    component: SourceId,
    event: SourceId,
) -> Option<PortMatch> {
    let event_name = source.name(event);
    for port in source.ports(component) {
        for interface in source.provided_interfaces(port) {
            for operation in source.operations(interface) {
                if !source.has_stereotype(operation, &conventions.stereotypes.operation_with_event) {
                    continue;
                }
                let tagged = source
                    .tag(operation, &conventions.tags.event)
                    .map(|tag| match tag.as_element() {
                        Some(id) => id == event,
                        None => tag.as_text() == Some(event_name),
                    })
                    .unwrap_or(false);
                if tagged {
                    return Some(PortMatch { port, operation });
                }
            }
        }
    }
    None
}

/// Search every software component of the event's package.
pub fn operation_with_event<S: SourceGraph>(
    source: &S,
    conventions: &Conventions,
    event: SourceId,
) -> Option<PortMatch> {
    let package = source.owner(event)?;
    source
        .classes(package)
        .into_iter()
        .filter(|class| matches!(source.kind(*class), Some(SourceKind::SoftwareComponent)))
        .find_map(|component| operation_with_event_on(source, conventions, component, event))
}

/// Interface in the event's package with a reception of an event of the same name.
pub fn interface_receiving_event<S: SourceGraph>(source: &S, event: SourceId) -> Option<SourceId> {
    let package = source.owner(event)?;
    let event_name = source.name(event);
    source
        .classes(package)
        .into_iter()
        .filter(|class| matches!(source.kind(*class), Some(SourceKind::Interface)))
        .find(|interface| {
            source.interface_items(*interface).into_iter().any(|item| {
                source
                    .reception_event(item)
                    .map(|received| source.name(received) == event_name)
                    .unwrap_or(false)
            })
        })
}

impl<S: SourceGraph, T: TargetGraph> Transformer<S, T> {
    fn first_port(&mut self, operation: SourceId, side: Side) -> Option<SourceId> {
        let matches = port_matches(&self.source, operation, side);
        let first = matches.first()?.port;
        if matches.iter().any(|m| m.port != first) {
            let ports: Vec<&str> = matches.iter().map(|m| self.source.name(m.port)).collect();
            self.diagnostics.warning(
                RULE,
                format!(
                    "operation '{}' matches several ports ({}); using '{}'",
                    self.source.name(operation),
                    ports.join(", "),
                    self.source.name(first)
                ),
            );
        }
        Some(first)
    }

    pub fn find_providing_port(&mut self, operation: SourceId) -> Option<SourceId> {
        self.first_port(operation, Side::Provided)
    }

    pub fn find_requiring_port(&mut self, operation: SourceId) -> Option<SourceId> {
        self.first_port(operation, Side::Required)
    }

    pub fn is_provided_operation_impl(&self, operation: SourceId) -> bool {
        !port_matches(&self.source, operation, Side::Provided).is_empty()
    }

    pub fn find_operation_with_event(&self, event: SourceId) -> Option<PortMatch> {
        operation_with_event(&self.source, &self.conventions, event)
    }

    /// Component operation implementing the «operationWevent» operation bound to `event`.
    pub fn find_operation_impl_for_event(&mut self, event: SourceId) -> Option<SourceId> {
        let Some(bound) = self.find_operation_with_event(event) else {
            self.diagnostics.severe(
                RULE,
                format!("no «operationWevent» operation found for event '{}'", self.source.name(event)),
            );
            return None;
        };
        let component = self.source.owner(bound.port)?;
        let matches = implementation_matches(&self.source, component, bound.operation);
        if matches.len() > 1 {
            self.diagnostics.warning(
                RULE,
                format!(
                    "{} operations of '{}' implement '{}'; using '{}'",
                    matches.len(),
                    self.source.name(component),
                    self.source.name(bound.operation),
                    self.source.name(matches[0])
                ),
            );
        }
        matches.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::Severity;
    use crate::domain::source::{SourceModel, TagValue};
    use crate::domain::target::TargetModel;

    fn interface(m: &mut SourceModel, pkg: SourceId, name: &str, ops: &[&str]) -> SourceId {
        let iface = m.add(pkg, name, SourceKind::Interface);
        for op in ops {
            let id = m.add(iface, op, SourceKind::Operation);
            m.stereotype(id, "operationWevent");
        }
        iface
    }

    #[test]
    fn test_suffix_tie_break_is_first_in_order() {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        let i_foo = interface(&mut m, pkg, "IFoo", &["foo"]);
        let i_barfoo = interface(&mut m, pkg, "IBarFoo", &["barfoo"]);
        let ctrl = m.add(pkg, "Ctrl", SourceKind::SoftwareComponent);
        let p_foo = m.add(ctrl, "pFoo", SourceKind::Port { provided: vec![i_foo], required: vec![] });
        let p_bar = m.add(ctrl, "pBarFoo", SourceKind::Port { provided: vec![i_barfoo], required: vec![] });
        let impl_foo = m.add(ctrl, "implfoo", SourceKind::Operation);
        let x_bar_foo = m.add(ctrl, "xbarfoo", SourceKind::Operation);

        assert_eq!(port_matches(&m, impl_foo, Side::Provided).len(), 1);
        assert_eq!(port_matches(&m, x_bar_foo, Side::Provided).len(), 2);

        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
        assert_eq!(t.find_providing_port(impl_foo), Some(p_foo));
        assert_eq!(t.diagnostics().count(Severity::Warning), 0);

        assert_eq!(t.find_providing_port(x_bar_foo), Some(p_foo));
        assert_eq!(t.diagnostics().count(Severity::Warning), 1);
        assert_ne!(p_foo, p_bar);

        let first = port_matches(t.source(), x_bar_foo, Side::Provided);
        for _ in 0..3 {
            assert_eq!(t.find_providing_port(x_bar_foo), Some(p_foo));
            assert_eq!(port_matches(t.source(), x_bar_foo, Side::Provided), first);
        }
        assert_eq!(t.diagnostics().count(Severity::Warning), 4);
        assert!(t.find_requiring_port(x_bar_foo).is_none());
    }

    #[test]
    fn test_event_binding_and_implementation() {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        let cs = interface(&mut m, pkg, "IStart", &["Start"]);
        let start = m.operations(cs)[0];
        SourceModel::tag(&mut m, start, "event", TagValue::Text("evStart".into()));
        let ev = m.add(pkg, "evStart", SourceKind::Event);
        let unbound = m.add(pkg, "evIdle", SourceKind::Event);
        let ctrl = m.add(pkg, "Ctrl", SourceKind::SoftwareComponent);
        let port = m.add(ctrl, "pStart", SourceKind::Port { provided: vec![cs], required: vec![] });
        let implementation = m.add(ctrl, "pStart_Start", SourceKind::Operation);

        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
        assert_eq!(
            t.find_operation_with_event(ev),
            Some(PortMatch { port, operation: start })
        );
        assert_eq!(t.find_operation_impl_for_event(ev), Some(implementation));
        assert!(t.is_provided_operation_impl(implementation));

        assert_eq!(t.find_operation_impl_for_event(unbound), None);
        assert_eq!(t.diagnostics().count(Severity::Severe), 1);
    }
}
