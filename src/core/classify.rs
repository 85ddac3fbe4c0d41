//! Eligibility and shape decisions for source elements.
//!
//! Every predicate here only reads the source model; the single side effect
//! is logging into the session diagnostics.

use crate::config::toml_config::Conventions;
use crate::core::diagnostics::Diagnostics;
use crate::core::resolve;
use crate::core::session::Enrichment;
use crate::domain::ports::SourceGraph;
use crate::domain::source::{SourceId, SourceKind};
use crate::domain::target::TargetKind;

const RULE: &str = "classify";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    SenderReceiver,
    ClientServer,
    Unclassified,
}

/// Communication role of a port, decided by its first interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    /// Provides a client-server interface.
    Server,
    /// Requires a sender-receiver interface.
    Sender,
    /// Provides a sender-receiver interface.
    Receiver,
    /// Requires a client-server interface.
    Client,
}

impl PortRole {
    pub fn is_provided(self) -> bool {
        matches!(self, PortRole::Server | PortRole::Sender)
    }

    pub fn is_required(self) -> bool {
        !self.is_provided()
    }
}

/// Target shape a source element is transformed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    RootPackage,
    SenderReceiverInterface,
    ClientServerInterface,
    ApplicationComponent,
    ClientServerOperation,
    DataElement,
    ReceptionDataElement,
    ClientServerArgument,
    SenderReceiverArgument,
    Runnable,
    TimingEvent,
    OperationInvokedEvent,
    InterRunnableVariable,
    PerInstanceMemory,
    CalibrationParameter,
    FlowDataElement,
    ProvidedPort,
    RequiredPort,
    ComponentPrototype,
    AssemblyConnector,
    ImplementationDataType,
}

impl TargetShape {
    pub fn target_kind(self) -> TargetKind {
        match self {
            TargetShape::RootPackage => TargetKind::ArPackage,
            TargetShape::SenderReceiverInterface => TargetKind::SenderReceiverInterface,
            TargetShape::ClientServerInterface => TargetKind::ClientServerInterface,
            TargetShape::ApplicationComponent => TargetKind::ApplicationSwComponentType,
            TargetShape::ClientServerOperation => TargetKind::ClientServerOperation,
            TargetShape::DataElement
            | TargetShape::ReceptionDataElement
            | TargetShape::SenderReceiverArgument
            | TargetShape::InterRunnableVariable
            | TargetShape::FlowDataElement => TargetKind::VariableDataPrototype,
            TargetShape::ClientServerArgument => TargetKind::ArgumentDataPrototype,
            TargetShape::Runnable => TargetKind::RunnableEntity,
            TargetShape::TimingEvent => TargetKind::TimingEvent,
            TargetShape::OperationInvokedEvent => TargetKind::OperationInvokedEvent,
            TargetShape::PerInstanceMemory => TargetKind::PerInstanceMemory,
            TargetShape::CalibrationParameter => TargetKind::ParameterDataPrototype,
            TargetShape::ProvidedPort => TargetKind::PPortPrototype,
            TargetShape::RequiredPort => TargetKind::RPortPrototype,
            TargetShape::ComponentPrototype => TargetKind::SwComponentPrototype,
            TargetShape::AssemblyConnector => TargetKind::AssemblySwConnector,
            TargetShape::ImplementationDataType => TargetKind::ImplementationDataType,
        }
    }

    /// Rule run after placement, if the shape needs more than a container.
    pub fn enrichment(self) -> Option<Enrichment> {
        match self {
            TargetShape::RootPackage
            | TargetShape::SenderReceiverInterface
            | TargetShape::ClientServerInterface
            | TargetShape::ClientServerOperation => None,
            TargetShape::ApplicationComponent => Some(Enrichment::ComponentBehavior),
            TargetShape::DataElement => Some(Enrichment::DataElement),
            TargetShape::ReceptionDataElement => Some(Enrichment::ReceptionDataElement),
            TargetShape::ClientServerArgument => Some(Enrichment::ClientServerArgument),
            TargetShape::SenderReceiverArgument => Some(Enrichment::SenderReceiverArgument),
            TargetShape::Runnable => Some(Enrichment::Runnable),
            TargetShape::TimingEvent => Some(Enrichment::TimingEvent),
            TargetShape::OperationInvokedEvent => Some(Enrichment::OperationInvokedEvent),
            TargetShape::InterRunnableVariable => Some(Enrichment::InterRunnableVariable),
            TargetShape::PerInstanceMemory => Some(Enrichment::PerInstanceMemory),
            TargetShape::CalibrationParameter => Some(Enrichment::Calibration),
            TargetShape::FlowDataElement => Some(Enrichment::FlowData),
            TargetShape::ProvidedPort => Some(Enrichment::ProvidedPort),
            TargetShape::RequiredPort => Some(Enrichment::RequiredPort),
            TargetShape::ComponentPrototype => Some(Enrichment::ComponentPrototype),
            TargetShape::AssemblyConnector => Some(Enrichment::AssemblyConnector),
            TargetShape::ImplementationDataType => Some(Enrichment::DataType),
        }
    }
}

pub struct Classifier<'a, S: SourceGraph> {
    source: &'a S,
    conventions: &'a Conventions,
    diagnostics: &'a mut Diagnostics,
}

impl<'a, S: SourceGraph> Classifier<'a, S> {
    pub fn new(source: &'a S, conventions: &'a Conventions, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            source,
            conventions,
            diagnostics,
        }
    }

    fn is_kind(&self, id: SourceId, kind: fn(&SourceKind) -> bool) -> bool {
        self.source.kind(id).map(kind).unwrap_or(false)
    }

    fn owner_is(&self, id: SourceId, kind: fn(&SourceKind) -> bool) -> bool {
        self.source.owner(id).map(|o| self.is_kind(o, kind)).unwrap_or(false)
    }

    pub fn is_operation_with_data(&self, item: SourceId) -> bool {
        self.source
            .has_stereotype(item, &self.conventions.stereotypes.operation_with_data)
    }

    pub fn is_operation_with_event(&self, item: SourceId) -> bool {
        self.source
            .has_stereotype(item, &self.conventions.stereotypes.operation_with_event)
    }

    /// Every item is an «operationWdata» operation or an event reception.
    /// A partial match is a modelling error and reported as severe.
    pub fn is_sender_receiver(&mut self, interface: SourceId) -> bool {
        let items = self.source.interface_items(interface);
        let matching = items
            .iter()
            .filter(|item| {
                self.is_operation_with_data(**item)
                    || self.is_kind(**item, |k| matches!(k, SourceKind::EventReception { .. }))
            })
            .count();

        if matching == items.len() {
            return true;
        }
        if matching > 0 {
            self.diagnostics.severe(
                RULE,
                format!(
                    "interface '{}' mixes sender-receiver items with other items; it should only contain «{}» operations or receptions",
                    self.source.name(interface),
                    self.conventions.stereotypes.operation_with_data
                ),
            );
        }
        false
    }

    /// Every item carries «operationWevent». Mismatches are not reported.
    pub fn is_client_server(&self, interface: SourceId) -> bool {
        self.source
            .interface_items(interface)
            .into_iter()
            .all(|item| self.is_operation_with_event(item))
    }

    pub fn interface_kind(&mut self, interface: SourceId) -> InterfaceKind {
        if self.source.interface_items(interface).is_empty() {
            return InterfaceKind::Unclassified;
        }
        let client_server = self.is_client_server(interface);
        let sender_receiver = self.is_sender_receiver(interface);
        match (sender_receiver, client_server) {
            (true, false) => InterfaceKind::SenderReceiver,
            (false, true) => InterfaceKind::ClientServer,
            (true, true) => {
                self.diagnostics.warning(
                    RULE,
                    format!(
                        "interface '{}' carries both data and event operations on every item",
                        self.source.name(interface)
                    ),
                );
                InterfaceKind::Unclassified
            }
            (false, false) => InterfaceKind::Unclassified,
        }
    }

    /// Role of a port from the first interface of its populated side.
    pub fn port_role(&mut self, port: SourceId) -> Option<PortRole> {
        let provided = self.source.provided_interfaces(port);
        let required = self.source.required_interfaces(port);
        match (provided.first(), required.first()) {
            (Some(&interface), None) => match self.interface_kind(interface) {
                InterfaceKind::ClientServer => Some(PortRole::Server),
                InterfaceKind::SenderReceiver => Some(PortRole::Receiver),
                InterfaceKind::Unclassified => None,
            },
            (None, Some(&interface)) => match self.interface_kind(interface) {
                InterfaceKind::ClientServer => Some(PortRole::Client),
                InterfaceKind::SenderReceiver => Some(PortRole::Sender),
                InterfaceKind::Unclassified => None,
            },
            _ => {
                self.diagnostics.warning(
                    RULE,
                    format!(
                        "port '{}' needs exactly one of provided or required interfaces",
                        self.source.name(port)
                    ),
                );
                None
            }
        }
    }

    pub fn is_provided_port(&mut self, port: SourceId) -> bool {
        self.port_role(port).map(PortRole::is_provided).unwrap_or(false)
    }

    pub fn is_required_port(&mut self, port: SourceId) -> bool {
        self.port_role(port).map(PortRole::is_required).unwrap_or(false)
    }

    /// Some «operationWevent» operation provided by a software component of
    /// the event's package names this event in its `event` tag.
    pub fn is_event_for_operation_with_event(&self, event: SourceId) -> bool {
        resolve::operation_with_event(self.source, self.conventions, event).is_some()
    }

    pub fn is_plain_reception(&self, reception: SourceId) -> bool {
        match self.source.reception_event(reception) {
            Some(event) => !self.is_event_for_operation_with_event(event),
            None => false,
        }
    }

    pub fn is_event_with_parameters(&self, event: SourceId) -> bool {
        !self.source.arguments(event).is_empty()
    }

    pub fn owner_is_component(&self, id: SourceId) -> bool {
        self.owner_is(id, |k| matches!(k, SourceKind::SoftwareComponent))
    }

    pub fn owner_is_interface(&self, id: SourceId) -> bool {
        self.owner_is(id, |k| matches!(k, SourceKind::Interface))
    }

    pub fn is_static_attribute(&self, attribute: SourceId) -> bool {
        matches!(
            self.source.kind(attribute),
            Some(SourceKind::Attribute { is_static: true, .. })
        ) && self.owner_is_component(attribute)
    }

    pub fn is_timing_operation(&self, operation: SourceId) -> bool {
        self.source
            .has_stereotype(operation, &self.conventions.stereotypes.timing_event)
    }

    /// Interface owning the operation that owns `argument`.
    fn argument_interface(&self, argument: SourceId) -> Option<SourceId> {
        let operation = self.source.owner(argument)?;
        if !self.is_kind(operation, |k| matches!(k, SourceKind::Operation)) {
            return None;
        }
        let interface = self.source.owner(operation)?;
        self.is_kind(interface, |k| matches!(k, SourceKind::Interface))
            .then_some(interface)
    }

    pub fn is_client_server_argument(&self, argument: SourceId) -> bool {
        self.argument_interface(argument)
            .map(|interface| self.is_client_server(interface))
            .unwrap_or(false)
    }

    pub fn is_sender_receiver_argument(&mut self, argument: SourceId) -> bool {
        if let Some(interface) = self.argument_interface(argument) {
            return self.is_sender_receiver(interface);
        }
        let Some(event) = self.source.owner(argument) else {
            return false;
        };
        if !self.is_kind(event, |k| matches!(k, SourceKind::Event)) {
            return false;
        }
        match resolve::interface_receiving_event(self.source, event) {
            Some(interface) => self.is_sender_receiver(interface),
            None => false,
        }
    }

    pub fn is_used_in_link(&self, instance: SourceId) -> bool {
        let Some(package) = self.source.owner(instance) else {
            return false;
        };
        self.source.links(package).into_iter().any(|link| {
            matches!(
                self.source.kind(link),
                Some(SourceKind::Link { from, to }) if from.instance == instance || to.instance == instance
            )
        })
    }

    fn attribute_shape(&self, attribute: SourceId) -> Option<TargetShape> {
        let stereotypes = &self.conventions.stereotypes;
        let component_owned = self.owner_is_component(attribute);
        if component_owned && self.source.has_stereotype(attribute, &stereotypes.per_instance_memory) {
            Some(TargetShape::PerInstanceMemory)
        } else if component_owned && self.source.has_stereotype(attribute, &stereotypes.calibration) {
            Some(TargetShape::CalibrationParameter)
        } else if self.source.has_stereotype(attribute, &stereotypes.flow_property) {
            Some(TargetShape::FlowDataElement)
        } else if self.is_static_attribute(attribute) {
            Some(TargetShape::InterRunnableVariable)
        } else {
            None
        }
    }

    fn operation_shape(&mut self, operation: SourceId) -> Option<TargetShape> {
        if self.owner_is_component(operation) {
            return if self.is_timing_operation(operation) {
                Some(TargetShape::TimingEvent)
            } else {
                Some(TargetShape::Runnable)
            };
        }
        if !self.owner_is_interface(operation) {
            return None;
        }
        let interface = self.source.owner(operation)?;
        match self.interface_kind(interface) {
            InterfaceKind::ClientServer => Some(TargetShape::ClientServerOperation),
            InterfaceKind::SenderReceiver if self.is_operation_with_data(operation) => Some(TargetShape::DataElement),
            _ => None,
        }
    }

    /// Shape of `id`, or `None` when the element is not transformed.
    pub fn classify(&mut self, id: SourceId) -> Option<TargetShape> {
        let kind = self.source.kind(id)?.clone();
        match kind {
            SourceKind::Package => Some(TargetShape::RootPackage),
            SourceKind::Interface => match self.interface_kind(id) {
                InterfaceKind::SenderReceiver => Some(TargetShape::SenderReceiverInterface),
                InterfaceKind::ClientServer => Some(TargetShape::ClientServerInterface),
                InterfaceKind::Unclassified => {
                    self.diagnostics.info(
                        RULE,
                        format!("interface '{}' is neither sender-receiver nor client-server", self.source.name(id)),
                    );
                    None
                }
            },
            SourceKind::SoftwareComponent => Some(TargetShape::ApplicationComponent),
            SourceKind::Block => None,
            SourceKind::DataType(_) => Some(TargetShape::ImplementationDataType),
            SourceKind::EnumerationLiteral { .. } => None,
            SourceKind::Operation => self.operation_shape(id),
            SourceKind::EventReception { .. } => {
                let interface = self.source.owner(id)?;
                let receives = self.owner_is_interface(id)
                    && self.interface_kind(interface) == InterfaceKind::SenderReceiver
                    && self.is_plain_reception(id);
                receives.then_some(TargetShape::ReceptionDataElement)
            }
            SourceKind::Event => self
                .is_event_for_operation_with_event(id)
                .then_some(TargetShape::OperationInvokedEvent),
            SourceKind::Port { .. } => {
                if !self.owner_is_component(id) {
                    return None;
                }
                self.port_role(id).map(|role| {
                    if role.is_provided() {
                        TargetShape::ProvidedPort
                    } else {
                        TargetShape::RequiredPort
                    }
                })
            }
            SourceKind::Attribute { .. } => self.attribute_shape(id),
            SourceKind::Argument { .. } => {
                if self.is_client_server_argument(id) {
                    Some(TargetShape::ClientServerArgument)
                } else if self.is_sender_receiver_argument(id) {
                    Some(TargetShape::SenderReceiverArgument)
                } else {
                    None
                }
            }
            SourceKind::Instance { .. } => self.is_used_in_link(id).then_some(TargetShape::ComponentPrototype),
            SourceKind::Link { .. } => Some(TargetShape::AssemblyConnector),
        }
    }
}
