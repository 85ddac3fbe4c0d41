use crate::core::context::COMPONENT_TYPES;
use crate::core::resolve::{implementation_matches, operation_with_event_on};
use crate::core::session::Transformer;
use crate::domain::ports::{SourceGraph, TargetGraph};
use crate::domain::source::SourceId;
use crate::domain::target::{Collection, Property, Reference, TargetKind};
use crate::utils::error::{Result, TransformError};
use tracing::debug;

impl<S: SourceGraph, T: TargetGraph> Transformer<S, T> {
    pub(crate) fn wire_component_behavior(&mut self, component: SourceId) -> Result<()> {
        let target = self.counterpart(component, "ApplicationSwComponentType")?;
        self.ensure_internal_behavior(target)?;
        Ok(())
    }

    /// Component operation implementing or calling an interface operation.
    pub(crate) fn wire_runnable(&mut self, operation: SourceId) -> Result<()> {
        let runnable = self.counterpart(operation, "RunnableEntity")?;
        let port = match self.find_providing_port(operation) {
            Some(port) => port,
            None => self
                .find_requiring_port(operation)
                .ok_or_else(|| TransformError::NotFound {
                    what: "port with a matching interface operation".to_string(),
                    element: self.name_of(operation),
                })?,
        };

        if self.is_provided_operation_impl(operation) {
            let name = format!("{}_{}", self.source.name(port), self.source.name(operation));
            self.target.set_short_name(runnable, &name)?;
        }

        let behavior = self.behavior_of_owner(operation)?;
        self.target.push_child(behavior, Collection::Runnables, runnable)?;
        self.complete_runnable(runnable)
    }

    pub(crate) fn wire_timing_event(&mut self, operation: SourceId) -> Result<()> {
        let event = self.counterpart(operation, "TimingEvent")?;
        let behavior = self.behavior_of_owner(operation)?;

        let name = format!(
            "{}{}",
            self.conventions.naming.timing_event_prefix,
            self.target.short_name(event).unwrap_or_default()
        );
        self.target.set_short_name(event, &name)?;
        self.target.push_child(behavior, Collection::Events, event)?;

        let runnable = self.new_runnable(behavior, &self.name_of(operation))?;
        self.target.set_reference(event, Reference::StartOnEvent, runnable)?;

        let period = self
            .source
            .tag(operation, &self.conventions.tags.period)
            .and_then(|tag| tag.as_number());
        match period {
            Some(period) => self.target.set_property(event, Property::Period, period)?,
            None => self.diagnostics.warning(
                "timing-event",
                format!("no value for '{}' in operation '{}'", self.conventions.tags.period, self.source.name(operation)),
            ),
        }
        Ok(())
    }

    /// Binds the event to the first component type, in package order, that
    /// provides the «operationWevent» operation naming it.
    pub(crate) fn wire_operation_invoked_event(&mut self, event: SourceId) -> Result<()> {
        let target_event = self.counterpart(event, "OperationInvokedEvent")?;
        let root = self.package_root(event)?;
        let component_types = self
            .find_package_path(root, &COMPONENT_TYPES)
            .ok_or_else(|| TransformError::NotFound {
                what: "ComponentTypes package".to_string(),
                element: self.name_of(event),
            })?;

        let bound = self
            .target
            .children(component_types, Collection::Elements)
            .into_iter()
            .filter(|id| self.target.kind(*id) == Some(TargetKind::ApplicationSwComponentType))
            .find_map(|component| {
                let source_component = self.registry.reverse_lookup(component)?;
                operation_with_event_on(&self.source, &self.conventions, source_component, event)
                    .map(|found| (component, source_component, found))
            });
        let Some((component, source_component, found)) = bound else {
            return Err(TransformError::NotFound {
                what: "ApplicationSwComponentType".to_string(),
                element: self.name_of(event),
            });
        };
        debug!(event = %self.source.name(event), component = %self.source.name(source_component), "operation-invoked event bound");

        let operation = self.counterpart(found.operation, "ClientServerOperation")?;
        let port = self.counterpart(found.port, "PPortPrototype")?;
        let instance_ref = self
            .target
            .create(TargetKind::POperationInAtomicSwcInstanceRef);
        self.target
            .set_reference(instance_ref, Reference::TargetProvidedOperation, operation)?;
        self.target
            .set_reference(instance_ref, Reference::ContextPPort, port)?;
        self.target
            .set_reference(target_event, Reference::Operation, instance_ref)?;

        let behavior = self.ensure_internal_behavior(component)?;
        self.target.push_child(behavior, Collection::Events, target_event)?;

        let implementation = implementation_matches(&self.source, source_component, found.operation)
            .first()
            .copied();
        match implementation.and_then(|op| self.registry.lookup(op)) {
            Some(runnable) => self
                .target
                .set_reference(target_event, Reference::StartOnEvent, runnable)?,
            None => self.diagnostics.warning(
                "operation-invoked-event",
                format!(
                    "no runnable implements '{}' for event '{}'",
                    self.source.name(found.operation),
                    self.source.name(event)
                ),
            ),
        }
        Ok(())
    }

    pub(crate) fn wire_inter_runnable_variable(&mut self, attribute: SourceId) -> Result<()> {
        let variable = self.counterpart(attribute, "VariableDataPrototype")?;
        let behavior = self.behavior_of_owner(attribute)?;
        self.target
            .push_child(behavior, Collection::ExplicitInterRunnableVariables, variable)?;
        self.assign_type("inter-runnable-variable", attribute, variable)
    }

    pub(crate) fn wire_per_instance_memory(&mut self, attribute: SourceId) -> Result<()> {
        let memory = self.counterpart(attribute, "PerInstanceMemory")?;
        let name = format!(
            "{}{}",
            self.source.name(attribute),
            self.conventions.naming.per_instance_memory_suffix
        );
        self.target.set_short_name(memory, &name)?;

        let behavior = self.behavior_of_owner(attribute)?;
        self.target
            .push_child(behavior, Collection::PerInstanceMemories, memory)?;

        let conditional = self.data_def_props(memory)?;
        let type_ref = self.source.type_of(attribute);
        if let Some(data_type) = self.type_counterpart("per-instance-memory", attribute, type_ref) {
            self.target
                .set_reference(conditional, Reference::ValueAxisDataType, data_type)?;
        }
        Ok(())
    }

    pub(crate) fn wire_calibration(&mut self, attribute: SourceId) -> Result<()> {
        let parameter = self.counterpart(attribute, "ParameterDataPrototype")?;
        let name = format!("{}{}", self.source.name(attribute), self.conventions.naming.calibration_suffix);
        self.target.set_short_name(parameter, &name)?;

        let behavior = self.behavior_of_owner(attribute)?;
        self.target
            .push_child(behavior, Collection::PerInstanceParameters, parameter)?;
        self.data_def_props(parameter)?;

        let init = self.numerical_value();
        let label = self.conventions.naming.calibration_init_label.clone();
        self.target.set_property(init, Property::ShortLabel, label)?;
        self.target.set_property(init, Property::Value, 0_i64)?;
        self.target.set_reference(parameter, Reference::InitValue, init)?;

        self.assign_type("calibration", attribute, parameter)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::toml_config::Conventions;
    use crate::core::diagnostics::Severity;
    use crate::core::session::Transformer;
    use crate::domain::ports::TargetGraph;
    use crate::domain::source::{DataTypeKind, SourceKind, SourceModel, TagValue};
    use crate::domain::target::{Collection, Property, PropertyValue, Reference, TargetKind, TargetModel};

    /// `Ctrl` serves `IStart.Start` through `pStart` and implements it with
    /// `doStart`; `evStart` invokes it.
    fn server_model() -> SourceModel {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        let cs = m.add(pkg, "IStart", SourceKind::Interface);
        let start = m.add(cs, "Start", SourceKind::Operation);
        m.stereotype(start, "operationWevent")
            .tag(start, "event", TagValue::Text("evStart".into()));
        m.add(pkg, "evStart", SourceKind::Event);

        let ctrl = m.add(pkg, "Ctrl", SourceKind::SoftwareComponent);
        m.add(ctrl, "pStart", SourceKind::Port { provided: vec![cs], required: vec![] });
        m.add(ctrl, "doStart", SourceKind::Operation);
        let tick = m.add(ctrl, "tick", SourceKind::Operation);
        m.stereotype(tick, "timingEvent")
            .tag(tick, "period", TagValue::Text("0.01".into()));
        m
    }

    #[test]
    fn test_runnable_is_renamed_and_started_by_invocation() {
        let mut t = Transformer::new(server_model(), TargetModel::new(), Conventions::default());
        t.run();
        let target = t.target();

        let behavior = target.of_kind(TargetKind::SwcInternalBehavior)[0];
        assert_eq!(target.short_name(behavior), Some("IB_Ctrl"));
        assert_eq!(target.count_kind(TargetKind::SwcInternalBehavior), 1);

        let runnables = target.children(behavior, Collection::Runnables);
        let names: Vec<&str> = runnables.iter().filter_map(|r| target.short_name(*r)).collect();
        assert_eq!(names, vec!["pStart_doStart", "tick"]);
        assert_eq!(
            target.property(runnables[0], Property::Symbol),
            Some(&PropertyValue::Text("pStart_doStart".into()))
        );
        assert_eq!(
            target.property(runnables[0], Property::MinimumStartInterval),
            Some(&PropertyValue::Integer(100))
        );

        let invoked = target.of_kind(TargetKind::OperationInvokedEvent)[0];
        assert_eq!(target.reference(invoked, Reference::StartOnEvent), Some(runnables[0]));
        let instance_ref = target.reference(invoked, Reference::Operation).unwrap();
        let operation = target.of_kind(TargetKind::ClientServerOperation)[0];
        assert_eq!(target.reference(instance_ref, Reference::TargetProvidedOperation), Some(operation));

        let timing = target.of_kind(TargetKind::TimingEvent)[0];
        assert_eq!(target.short_name(timing), Some("TE_tick"));
        assert_eq!(target.reference(timing, Reference::StartOnEvent), Some(runnables[1]));
        assert_eq!(target.property(timing, Property::Period).and_then(|p| p.as_number()), Some(0.01));
        assert_eq!(target.children(behavior, Collection::Events), vec![timing, invoked]);
        assert_eq!(t.diagnostics().count(Severity::Severe), 0);
    }

    #[test]
    fn test_runnable_without_port_is_severe() {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        let ctrl = m.add(pkg, "Ctrl", SourceKind::SoftwareComponent);
        m.add(ctrl, "orphan", SourceKind::Operation);
        let tick = m.add(ctrl, "tick", SourceKind::Operation);
        m.stereotype(tick, "timingEvent");

        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
        t.run();

        assert_eq!(t.diagnostics().count(Severity::Severe), 1);
        assert!(t
            .diagnostics()
            .entries()
            .iter()
            .any(|d| d.severity == Severity::Warning && d.rule == "timing-event"));
        let orphan = t.target().of_kind(TargetKind::RunnableEntity)[0];
        assert!(t.is_in_progress(orphan));
    }

    #[test]
    fn test_memory_and_calibration_attributes() {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        let uint8 = m.add(pkg, "uint8", SourceKind::DataType(DataTypeKind::Primitive));
        let ctrl = m.add(pkg, "Ctrl", SourceKind::SoftwareComponent);
        let counter = m.add(ctrl, "counter", SourceKind::Attribute { is_static: false, type_ref: Some(uint8) });
        m.stereotype(counter, "PIMProperty");
        let gain = m.add(ctrl, "gain", SourceKind::Attribute { is_static: false, type_ref: Some(uint8) });
        m.stereotype(gain, "calibration");
        m.add(ctrl, "shared", SourceKind::Attribute { is_static: true, type_ref: Some(uint8) });

        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
        t.run();
        let target = t.target();
        let behavior = target.of_kind(TargetKind::SwcInternalBehavior)[0];
        let data_type = target.of_kind(TargetKind::ImplementationDataType)[0];

        let memory = target.children(behavior, Collection::PerInstanceMemories)[0];
        assert_eq!(target.short_name(memory), Some("counter_NV"));
        let props = target.reference(memory, Reference::SwDataDefProps).unwrap();
        let conditional = target.children(props, Collection::SwDataDefPropsVariants)[0];
        assert_eq!(target.reference(conditional, Reference::ValueAxisDataType), Some(data_type));

        let parameter = target.children(behavior, Collection::PerInstanceParameters)[0];
        assert_eq!(target.short_name(parameter), Some("gain_C"));
        assert_eq!(target.reference(parameter, Reference::Type), Some(data_type));
        let init = target.reference(parameter, Reference::InitValue).unwrap();
        assert_eq!(
            target.property(init, Property::ShortLabel),
            Some(&PropertyValue::Text("Init_0".into()))
        );
        assert_eq!(target.property(init, Property::Value), Some(&PropertyValue::Integer(0)));

        let variable = target.children(behavior, Collection::ExplicitInterRunnableVariables)[0];
        assert_eq!(target.short_name(variable), Some("shared"));
        assert_eq!(target.reference(variable, Reference::Type), Some(data_type));
    }
}
