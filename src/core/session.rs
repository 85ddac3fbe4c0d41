use crate::config::toml_config::Conventions;
use crate::core::classify::Classifier;
use crate::core::diagnostics::Diagnostics;
use crate::core::registry::Correspondence;
use crate::domain::ports::{SourceGraph, TargetGraph};
use crate::domain::source::SourceId;
use crate::domain::target::TargetId;
use crate::utils::error::{Result, TransformError};
use std::collections::BTreeSet;

/// Structural rule run on a freshly created and registered target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    ComponentBehavior,
    RequiredPort,
    ProvidedPort,
    ClientServerArgument,
    SenderReceiverArgument,
    PerInstanceMemory,
    Calibration,
    InterRunnableVariable,
    FlowData,
    TimingEvent,
    Runnable,
    OperationInvokedEvent,
    ComponentPrototype,
    AssemblyConnector,
    DataElement,
    ReceptionDataElement,
    DataType,
}

impl Enrichment {
    pub fn label(self) -> &'static str {
        match self {
            Enrichment::ComponentBehavior => "component-behavior",
            Enrichment::RequiredPort => "required-port",
            Enrichment::ProvidedPort => "provided-port",
            Enrichment::ClientServerArgument => "cs-argument",
            Enrichment::SenderReceiverArgument => "sr-argument",
            Enrichment::PerInstanceMemory => "per-instance-memory",
            Enrichment::Calibration => "calibration",
            Enrichment::InterRunnableVariable => "inter-runnable-variable",
            Enrichment::FlowData => "flow-data",
            Enrichment::TimingEvent => "timing-event",
            Enrichment::Runnable => "runnable",
            Enrichment::OperationInvokedEvent => "operation-invoked-event",
            Enrichment::ComponentPrototype => "component-prototype",
            Enrichment::AssemblyConnector => "assembly-connector",
            Enrichment::DataElement => "data-element",
            Enrichment::ReceptionDataElement => "reception-data-element",
            Enrichment::DataType => "data-type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Applied,
    /// The rule stopped early; whatever it built so far is kept.
    Aborted,
}

/// One forward transformation: the source model, the target model under
/// construction and everything that ties them together.
pub struct Transformer<S: SourceGraph, T: TargetGraph> {
    pub(crate) source: S,
    pub(crate) target: T,
    pub(crate) registry: Correspondence,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) conventions: Conventions,
    pub(crate) in_progress: BTreeSet<TargetId>,
}

impl<S: SourceGraph, T: TargetGraph> Transformer<S, T> {
    pub fn new(source: S, target: T, conventions: Conventions) -> Self {
        Self {
            source,
            target,
            registry: Correspondence::new(),
            diagnostics: Diagnostics::new(),
            conventions,
            in_progress: BTreeSet::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn registry(&self) -> &Correspondence {
        &self.registry
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    pub fn into_parts(self) -> (T, Correspondence, Diagnostics) {
        (self.target, self.registry, self.diagnostics)
    }

    pub(crate) fn classifier(&mut self) -> Classifier<'_, S> {
        Classifier::new(&self.source, &self.conventions, &mut self.diagnostics)
    }

    /// Register a freshly created node. It stays in progress until
    /// [`Transformer::mark_complete`] is called for it.
    pub fn register(&mut self, source: SourceId, target: TargetId) -> Result<()> {
        self.registry.register(source, target)?;
        self.in_progress.insert(target);
        Ok(())
    }

    pub fn mark_complete(&mut self, target: TargetId) {
        self.in_progress.remove(&target);
    }

    pub fn is_in_progress(&self, target: TargetId) -> bool {
        self.in_progress.contains(&target)
    }

    pub fn lookup(&self, source: SourceId) -> Option<TargetId> {
        self.registry.lookup(source)
    }

    /// Registered counterpart of `source`, or a missing-correspondence error
    /// naming what the caller expected to find.
    pub(crate) fn counterpart(&self, source: SourceId, expected: &str) -> Result<TargetId> {
        self.registry
            .lookup(source)
            .ok_or_else(|| TransformError::missing(expected, self.source.name(source)))
    }

    pub(crate) fn name_of(&self, source: SourceId) -> String {
        self.source.name(source).to_string()
    }

    /// Run one enrichment rule for `element`. Errors never escape: they are
    /// logged at their severity and reported as [`RuleOutcome::Aborted`].
    pub fn enrich(&mut self, rule: Enrichment, element: SourceId) -> RuleOutcome {
        let result = match rule {
            Enrichment::ComponentBehavior => self.wire_component_behavior(element),
            Enrichment::RequiredPort => self.wire_required_port(element),
            Enrichment::ProvidedPort => self.wire_provided_port(element),
            Enrichment::ClientServerArgument => self.wire_client_server_argument(element),
            Enrichment::SenderReceiverArgument => self.wire_sender_receiver_argument(element),
            Enrichment::PerInstanceMemory => self.wire_per_instance_memory(element),
            Enrichment::Calibration => self.wire_calibration(element),
            Enrichment::InterRunnableVariable => self.wire_inter_runnable_variable(element),
            Enrichment::FlowData => self.wire_flow_data(element),
            Enrichment::TimingEvent => self.wire_timing_event(element),
            Enrichment::Runnable => self.wire_runnable(element),
            Enrichment::OperationInvokedEvent => self.wire_operation_invoked_event(element),
            Enrichment::ComponentPrototype => self.wire_component_prototype(element),
            Enrichment::AssemblyConnector => self.wire_assembly_connector(element),
            Enrichment::DataElement => self.wire_data_element(element),
            Enrichment::ReceptionDataElement => self.wire_reception_data_element(element),
            Enrichment::DataType => self.wire_data_type(element),
        };

        match result {
            Ok(()) => {
                if let Some(target) = self.registry.lookup(element) {
                    self.in_progress.remove(&target);
                }
                RuleOutcome::Applied
            }
            Err(err) => {
                self.diagnostics.report(err.severity(), rule.label(), err.to_string());
                RuleOutcome::Aborted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::Severity;
    use crate::domain::source::{SourceKind, SourceModel};
    use crate::domain::target::{Collection, TargetKind, TargetModel};

    fn server_model() -> (SourceModel, SourceId, SourceId) {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        let cs = m.add(pkg, "IStart", SourceKind::Interface);
        let start = m.add(cs, "Start", SourceKind::Operation);
        m.stereotype(start, "operationWevent");
        let ctrl = m.add(pkg, "Ctrl", SourceKind::SoftwareComponent);
        let port = m.add(ctrl, "pStart", SourceKind::Port { provided: vec![cs], required: vec![] });
        (m, ctrl, port)
    }

    #[test]
    fn test_missing_counterpart_aborts_with_one_severe_diagnostic() {
        let (m, _, port) = server_model();
        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
        let node = t.target.create_named(TargetKind::PPortPrototype, "pStart");
        t.register(port, node).unwrap();

        assert_eq!(t.enrich(Enrichment::ProvidedPort, port), RuleOutcome::Aborted);

        let entries = t.diagnostics().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Severe);
        assert_eq!(entries[0].rule, "provided-port");
        assert!(entries[0].message.contains("IStart"));
        assert!(t.is_in_progress(node));
    }

    #[test]
    fn test_unregistered_element_aborts() {
        let (m, ctrl, _) = server_model();
        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());

        assert_eq!(t.enrich(Enrichment::ComponentBehavior, ctrl), RuleOutcome::Aborted);
        assert_eq!(t.diagnostics().count(Severity::Severe), 1);
        assert_eq!(t.diagnostics().entries()[0].rule, "component-behavior");
    }

    #[test]
    fn test_applied_rule_completes_node() {
        let (m, ctrl, _) = server_model();
        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
        let node = t.target.create_named(TargetKind::ApplicationSwComponentType, "Ctrl");
        t.register(ctrl, node).unwrap();
        assert!(t.is_in_progress(node));

        assert_eq!(t.enrich(Enrichment::ComponentBehavior, ctrl), RuleOutcome::Applied);
        assert!(!t.is_in_progress(node));
        assert!(t.diagnostics().entries().is_empty());
        assert_eq!(t.target().children(node, Collection::InternalBehaviors).len(), 1);
    }
}
