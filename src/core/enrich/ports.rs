use crate::core::classify::PortRole;
use crate::core::session::Transformer;
use crate::domain::ports::{SourceGraph, TargetGraph};
use crate::domain::source::{SourceId, SourceKind};
use crate::domain::target::{Collection, Property, Reference, TargetId, TargetKind};
use crate::utils::error::{Result, TransformError};

const REQUIRED: &str = "required-port";
const PROVIDED: &str = "provided-port";

impl<S: SourceGraph, T: TargetGraph> Transformer<S, T> {
    pub(crate) fn wire_required_port(&mut self, port: SourceId) -> Result<()> {
        let role = self.classifier().port_role(port);
        match role {
            Some(PortRole::Receiver) => self.wire_receiver(port),
            Some(PortRole::Client) => self.wire_client(port),
            _ => Err(TransformError::Unclassifiable {
                element: self.name_of(port),
                reason: "not a receiver or client port".to_string(),
            }),
        }
    }

    pub(crate) fn wire_provided_port(&mut self, port: SourceId) -> Result<()> {
        let role = self.classifier().port_role(port);
        match role {
            Some(PortRole::Server) => self.wire_server(port),
            Some(PortRole::Sender) => self.wire_sender(port),
            _ => Err(TransformError::Unclassifiable {
                element: self.name_of(port),
                reason: "not a server or sender port".to_string(),
            }),
        }
    }

    fn first_interface(&self, port: SourceId, provided: bool) -> Result<SourceId> {
        let interfaces = if provided {
            self.source.provided_interfaces(port)
        } else {
            self.source.required_interfaces(port)
        };
        interfaces.first().copied().ok_or_else(|| TransformError::NotFound {
            what: "interface".to_string(),
            element: self.name_of(port),
        })
    }

    /// Number of software-component ports in the port's package requiring an
    /// interface named `interface_name`.
    fn requirers_of(&self, port: SourceId, interface_name: &str) -> usize {
        let Some(package) = self.source.owning_package(port) else {
            return 0;
        };
        self.source
            .classes(package)
            .into_iter()
            .filter(|class| matches!(self.source.kind(*class), Some(SourceKind::SoftwareComponent)))
            .flat_map(|class| self.source.ports(class))
            .flat_map(|candidate| self.source.required_interfaces(candidate))
            .filter(|interface| self.source.name(*interface) == interface_name)
            .count()
    }

    fn data_received_event(
        &mut self,
        behavior: TargetId,
        name: &str,
        port: TargetId,
        data: TargetId,
        runnable: TargetId,
    ) -> Result<TargetId> {
        let event = self.target.create_named(TargetKind::DataReceivedEvent, name);
        self.target.push_child(behavior, Collection::Events, event)?;
        let instance_ref = self.target.create(TargetKind::RVariableInAtomicSwcInstanceRef);
        self.target
            .set_reference(instance_ref, Reference::ContextRPort, port)?;
        self.target
            .set_reference(instance_ref, Reference::TargetDataElement, data)?;
        self.target.set_reference(event, Reference::Data, instance_ref)?;
        self.target
            .set_reference(event, Reference::StartOnEvent, runnable)?;
        Ok(event)
    }

    /// Receiver: the port provides a sender-receiver interface.
    fn wire_receiver(&mut self, port: SourceId) -> Result<()> {
        let r_port = self.counterpart(port, "RPortPrototype")?;
        let interface = self.first_interface(port, true)?;
        let interface_target = self.counterpart(interface, "SenderReceiverInterface")?;
        self.target
            .set_reference(r_port, Reference::RequiredInterface, interface_target)?;

        let behavior = self.behavior_of_owner(port)?;
        let requirers = self.requirers_of(port, self.source.name(interface));
        let prefix = self.conventions.naming.data_received_prefix.clone();

        for item in self.source.interface_items(interface) {
            let item_name = self.name_of(item);
            let data_element = self.registry.lookup(item);

            let com_spec = self.target.create(TargetKind::NonqueuedReceiverComSpec);
            self.target
                .push_child(r_port, Collection::RequiredComSpecs, com_spec)?;
            let init = self.numerical_value();
            self.target.set_reference(com_spec, Reference::InitValue, init)?;
            match data_element {
                Some(data) => self.target.set_reference(com_spec, Reference::DataElement, data)?,
                None => self.diagnostics.warning(
                    REQUIRED,
                    format!("no data element found for '{}' of port '{}'", item_name, self.source.name(port)),
                ),
            }

            let runnable = self.new_runnable(behavior, &item_name)?;
            let Some(data) = data_element else {
                continue;
            };

            for _ in 0..requirers {
                let name = format!("{}{}", prefix, item_name);
                self.data_received_event(behavior, &name, r_port, data, runnable)?;
                self.variable_access(runnable, Collection::DataReadAccesses, &name, r_port, data)?;

                for argument in self.source.arguments(item) {
                    let argument_name = self.name_of(argument);
                    let Some(argument_data) = self.registry.lookup(argument) else {
                        self.diagnostics.severe(
                            REQUIRED,
                            format!("no VariableDataPrototype found for argument '{}'", argument_name),
                        );
                        continue;
                    };
                    let event_name = format!("{}{}_{}", prefix, item_name, argument_name);
                    self.data_received_event(behavior, &event_name, r_port, argument_data, runnable)?;
                    self.append_data_element(interface_target, argument_data)?;
                    let access_name = format!("{}{}", prefix, argument_name);
                    self.variable_access(
                        runnable,
                        Collection::DataReadAccesses,
                        &access_name,
                        r_port,
                        argument_data,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Client: the port requires a client-server interface.
    fn wire_client(&mut self, port: SourceId) -> Result<()> {
        let r_port = self.counterpart(port, "RPortPrototype")?;
        let interface = self.first_interface(port, false)?;
        let interface_target = self.counterpart(interface, "ClientServerInterface")?;
        self.target
            .set_reference(r_port, Reference::RequiredInterface, interface_target)?;

        let behavior = self.behavior_of_owner(port)?;
        let port_name = self.name_of(port);
        let timeout = self.conventions.runnable.server_call_timeout;
        let prefix = self.conventions.naming.server_call_prefix.clone();

        for item in self.source.interface_items(interface) {
            let item_name = self.name_of(item);
            let operation = self.registry.lookup(item);

            let runnable = self.new_runnable(behavior, &format!("{}_{}", port_name, item_name))?;
            let call_point = self
                .target
                .create_named(TargetKind::SynchronousServerCallPoint, &format!("{}{}", prefix, item_name));
            self.target.set_property(call_point, Property::Timeout, timeout)?;
            self.target
                .push_child(runnable, Collection::ServerCallPoints, call_point)?;

            let operation_ref = self.target.create(TargetKind::ROperationInAtomicSwcInstanceRef);
            self.target
                .set_reference(operation_ref, Reference::ContextRPort, r_port)?;
            self.target
                .set_reference(call_point, Reference::Operation, operation_ref)?;

            let com_spec = self.target.create(TargetKind::ClientComSpec);
            self.target
                .push_child(r_port, Collection::RequiredComSpecs, com_spec)?;

            match operation {
                Some(operation) => {
                    self.target
                        .set_reference(operation_ref, Reference::TargetRequiredOperation, operation)?;
                    self.target
                        .set_reference(com_spec, Reference::Operation, operation)?;
                }
                None => self.diagnostics.warning(
                    REQUIRED,
                    format!("no ClientServerOperation found for '{}' of port '{}'", item_name, port_name),
                ),
            }
        }
        Ok(())
    }

    /// Server: the port provides a client-server interface. Only com specs
    /// are added; runnables come from the implementing operations.
    fn wire_server(&mut self, port: SourceId) -> Result<()> {
        let p_port = self.counterpart(port, "PPortPrototype")?;
        let interface = self.first_interface(port, true)?;
        let interface_target = self.counterpart(interface, "ClientServerInterface")?;
        self.target
            .set_reference(p_port, Reference::ProvidedInterface, interface_target)?;

        for item in self.source.interface_items(interface) {
            let com_spec = self.target.create(TargetKind::ServerComSpec);
            self.target
                .push_child(p_port, Collection::ProvidedComSpecs, com_spec)?;
            match self.registry.lookup(item) {
                Some(operation) => self
                    .target
                    .set_reference(com_spec, Reference::Operation, operation)?,
                None => self.diagnostics.warning(
                    PROVIDED,
                    format!("no ClientServerOperation found for '{}'", self.source.name(item)),
                ),
            }
        }
        Ok(())
    }

    /// Sender: the port requires a sender-receiver interface.
    fn wire_sender(&mut self, port: SourceId) -> Result<()> {
        let p_port = self.counterpart(port, "PPortPrototype")?;
        let interface = self.first_interface(port, false)?;
        let interface_target = self.counterpart(interface, "SenderReceiverInterface")?;
        self.target
            .set_reference(p_port, Reference::ProvidedInterface, interface_target)?;

        let behavior = self.behavior_of_owner(port)?;
        let port_name = self.name_of(port);
        let prefix = self.conventions.naming.data_send_prefix.clone();

        for item in self.source.interface_items(interface) {
            let item_name = self.name_of(item);
            let Some(data) = self.registry.lookup(item) else {
                self.diagnostics.severe(
                    PROVIDED,
                    format!("no VariableDataPrototype found for '{}'", item_name),
                );
                continue;
            };

            let com_spec = self.target.create(TargetKind::NonqueuedSenderComSpec);
            self.target
                .push_child(p_port, Collection::ProvidedComSpecs, com_spec)?;
            self.target.set_reference(com_spec, Reference::DataElement, data)?;
            let init = self.numerical_value();
            self.target.set_reference(com_spec, Reference::InitValue, init)?;

            let runnable = self.new_runnable(behavior, &format!("{}_{}", port_name, item_name))?;
            self.variable_access(
                runnable,
                Collection::DataSendPoints,
                &format!("{}{}", prefix, item_name),
                p_port,
                data,
            )?;

            let Some(event) = self.source.reception_event(item) else {
                continue;
            };
            for argument in self.source.arguments(event) {
                let argument_name = self.name_of(argument);
                let Some(argument_data) = self.registry.lookup(argument) else {
                    self.diagnostics.severe(
                        PROVIDED,
                        format!("no VariableDataPrototype found for argument '{}'", argument_name),
                    );
                    continue;
                };
                self.variable_access(
                    runnable,
                    Collection::DataSendPoints,
                    &format!("{}{}", prefix, argument_name),
                    p_port,
                    argument_data,
                )?;
            }
        }
        Ok(())
    }
}
