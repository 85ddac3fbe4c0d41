use crate::core::context::COMPU_METHODS;
use crate::core::resolve::interface_receiving_event;
use crate::core::session::Transformer;
use crate::domain::ports::{SourceGraph, TargetGraph};
use crate::domain::source::{ArgumentDirection, DataTypeKind, SourceId, SourceKind, TagValue};
use crate::domain::target::{Collection, Property, Reference, TargetId, TargetKind};
use crate::utils::error::{Result, TransformError};

fn direction_label(direction: ArgumentDirection) -> &'static str {
    match direction {
        ArgumentDirection::In => "IN",
        ArgumentDirection::Out => "OUT",
        ArgumentDirection::InOut => "INOUT",
    }
}

impl<S: SourceGraph, T: TargetGraph> Transformer<S, T> {
    pub(crate) fn wire_client_server_argument(&mut self, argument: SourceId) -> Result<()> {
        let target = self.counterpart(argument, "ArgumentDataPrototype")?;
        self.assign_type("cs-argument", argument, target)?;
        if let Some(SourceKind::Argument { direction, .. }) = self.source.kind(argument) {
            let label = direction_label(*direction);
            self.target.set_property(target, Property::Direction, label)?;
        }
        Ok(())
    }

    /// Typed, then appended once to the sender-receiver interface carrying
    /// the argument's operation or receiving its event.
    pub(crate) fn wire_sender_receiver_argument(&mut self, argument: SourceId) -> Result<()> {
        let target = self.counterpart(argument, "VariableDataPrototype")?;
        self.assign_type("sr-argument", argument, target)?;

        let owner = self.source.owner(argument);
        let interface = match owner.and_then(|o| self.source.kind(o)) {
            Some(SourceKind::Event) => owner.and_then(|event| interface_receiving_event(&self.source, event)),
            Some(SourceKind::Operation) => owner.and_then(|operation| self.source.owner(operation)),
            _ => None,
        };
        let interface = interface.ok_or_else(|| TransformError::NotFound {
            what: "sender-receiver interface".to_string(),
            element: self.name_of(argument),
        })?;
        let interface = self.counterpart(interface, "SenderReceiverInterface")?;
        self.append_data_element(interface, target)
    }

    pub(crate) fn wire_flow_data(&mut self, attribute: SourceId) -> Result<()> {
        let target = self.counterpart(attribute, "VariableDataPrototype")?;
        self.assign_type("flow-data", attribute, target)
    }

    /// «operationWdata» data element, named and typed after its `dataReceived` tag.
    pub(crate) fn wire_data_element(&mut self, operation: SourceId) -> Result<()> {
        let target = self.counterpart(operation, "VariableDataPrototype")?;
        let operation_name = self.name_of(operation);
        let tag_name = self.conventions.tags.data_received.clone();

        match self.source.tag(operation, &tag_name).cloned() {
            Some(TagValue::Element(data)) => {
                let name = format!("{}_{}", self.source.name(data), operation_name);
                self.target.set_short_name(target, &name)?;
                let type_ref = self.source.type_of(data);
                if let Some(data_type) = self.type_counterpart("data-element", data, type_ref) {
                    self.target.set_reference(target, Reference::Type, data_type)?;
                }
            }
            Some(TagValue::Text(text)) => {
                self.target
                    .set_short_name(target, &format!("{}_{}", text, operation_name))?;
                self.diagnostics.warning(
                    "data-element",
                    format!("'{}' of '{}' names no element; data element left untyped", tag_name, operation_name),
                );
            }
            _ => self.diagnostics.warning(
                "data-element",
                format!("no '{}' tag on operation '{}'", tag_name, operation_name),
            ),
        }
        Ok(())
    }

    pub(crate) fn wire_reception_data_element(&mut self, reception: SourceId) -> Result<()> {
        let target = self.counterpart(reception, "VariableDataPrototype")?;
        let event = self
            .source
            .reception_event(reception)
            .ok_or_else(|| TransformError::NotFound {
                what: "received event".to_string(),
                element: self.name_of(reception),
            })?;
        let type_ref = self
            .source
            .tag(event, &self.conventions.tags.event_type)
            .and_then(TagValue::as_element);
        if let Some(data_type) = self.type_counterpart("reception-data-element", event, type_ref) {
            self.target.set_reference(target, Reference::Type, data_type)?;
        }
        Ok(())
    }

    pub(crate) fn wire_data_type(&mut self, data_type: SourceId) -> Result<()> {
        let target = self.counterpart(data_type, "ImplementationDataType")?;
        let category = self.conventions.data_types.category.clone();
        self.target.set_property(target, Property::Category, category)?;
        let root = self.package_root(data_type)?;

        let kind = match self.source.kind(data_type) {
            Some(SourceKind::DataType(kind)) => kind.clone(),
            _ => {
                return Err(TransformError::Unclassifiable {
                    element: self.name_of(data_type),
                    reason: "not a data type".to_string(),
                })
            }
        };
        match kind {
            DataTypeKind::Enumeration => self.enumeration_structure(data_type, target, root),
            DataTypeKind::Typedef { .. } => {
                let conditional = self.data_def_props(target)?;
                let unit_name = self
                    .source
                    .tag(data_type, &self.conventions.tags.unit)
                    .and_then(|tag| tag.as_text())
                    .map(str::to_string);
                match unit_name {
                    Some(unit_name) => {
                        let unit = self.ensure_unit(root, &unit_name)?;
                        self.target.set_reference(conditional, Reference::Unit, unit)?;
                    }
                    None => self.diagnostics.warning(
                        "data-type",
                        format!("typedef '{}' has no '{}' tag", self.source.name(data_type), self.conventions.tags.unit),
                    ),
                }
                Ok(())
            }
            DataTypeKind::Primitive => {
                let conditional = self.data_def_props(target)?;
                let base = self.ensure_base_type(root, &self.name_of(data_type))?;
                self.target
                    .set_reference(conditional, Reference::BaseType, base)
            }
        }
    }

    /// TEXTTABLE compu method with one closed single-point scale per literal.
    fn enumeration_structure(&mut self, data_type: SourceId, target: TargetId, root: TargetId) -> Result<()> {
        let conditional = self.data_def_props(target)?;

        let methods = self.ensure_package_path(root, &COMPU_METHODS)?;
        let method = self.ensure_element(methods, TargetKind::CompuMethod, &self.name_of(data_type))?;
        self.target.set_property(method, Property::Category, "TEXTTABLE")?;
        let compu = self.target.create(TargetKind::Compu);
        self.target
            .set_reference(method, Reference::CompuInternalToPhys, compu)?;
        self.target
            .set_reference(conditional, Reference::CompuMethod, method)?;

        for (position, literal) in self.source.enumeration_literals(data_type).into_iter().enumerate() {
            let value = match self.source.kind(literal) {
                Some(SourceKind::EnumerationLiteral { value: Some(value) }) => *value,
                _ => position as i64,
            };
            let label = self.name_of(literal);
            let scale = self.target.create(TargetKind::CompuScale);
            self.target.set_property(scale, Property::LowerLimit, value)?;
            self.target.set_property(scale, Property::UpperLimit, value)?;
            self.target.set_property(scale, Property::IntervalType, "CLOSED")?;
            self.target.set_property(scale, Property::Vt, label)?;
            self.target.push_child(compu, Collection::CompuScales, scale)?;
        }

        let unit_name = self.conventions.naming.enum_unit.clone();
        let unit = self.ensure_unit(root, &unit_name)?;
        self.target.set_reference(method, Reference::Unit, unit)?;
        self.target.set_reference(conditional, Reference::Unit, unit)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::toml_config::Conventions;
    use crate::core::session::Transformer;
    use crate::domain::ports::TargetGraph;
    use crate::domain::source::{ArgumentDirection, DataTypeKind, SourceKind, SourceModel, TagValue};
    use crate::domain::target::{Collection, Property, PropertyValue, Reference, TargetKind, TargetModel};

    #[test]
    fn test_enumeration_gets_text_table_scales() {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        let mode = m.add(pkg, "Mode", SourceKind::DataType(DataTypeKind::Enumeration));
        m.add(mode, "A", SourceKind::EnumerationLiteral { value: None });
        m.add(mode, "B", SourceKind::EnumerationLiteral { value: None });
        let level = m.add(pkg, "Level", SourceKind::DataType(DataTypeKind::Enumeration));
        m.add(level, "Low", SourceKind::EnumerationLiteral { value: Some(10) });
        m.add(level, "High", SourceKind::EnumerationLiteral { value: None });

        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
        t.run();
        let target = t.target();

        let methods = target.of_kind(TargetKind::CompuMethod);
        assert_eq!(methods.len(), 2);
        let method = methods[0];
        assert_eq!(target.short_name(method), Some("Mode"));
        assert_eq!(
            target.property(method, Property::Category),
            Some(&PropertyValue::Text("TEXTTABLE".into()))
        );

        let compu = target.reference(method, Reference::CompuInternalToPhys).unwrap();
        let scales: Vec<(i64, String)> = target
            .children(compu, Collection::CompuScales)
            .into_iter()
            .map(|scale| {
                let lower = target.property(scale, Property::LowerLimit).and_then(|v| v.as_integer()).unwrap();
                let upper = target.property(scale, Property::UpperLimit).and_then(|v| v.as_integer()).unwrap();
                assert_eq!(lower, upper);
                let vt = target.property(scale, Property::Vt).and_then(|v| v.as_text()).unwrap();
                (lower, vt.to_string())
            })
            .collect();
        assert_eq!(scales, vec![(0, "A".to_string()), (1, "B".to_string())]);

        let level_compu = target.reference(methods[1], Reference::CompuInternalToPhys).unwrap();
        let lower: Vec<i64> = target
            .children(level_compu, Collection::CompuScales)
            .into_iter()
            .filter_map(|s| target.property(s, Property::LowerLimit).and_then(|v| v.as_integer()))
            .collect();
        assert_eq!(lower, vec![10, 1]);

        assert_eq!(target.count_kind(TargetKind::Unit), 1);
        let unit = target.of_kind(TargetKind::Unit)[0];
        assert_eq!(target.short_name(unit), Some("EnumUnit"));
        assert_eq!(target.reference(method, Reference::Unit), Some(unit));
    }

    #[test]
    fn test_category_follows_conventions() {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        m.add(pkg, "uint8", SourceKind::DataType(DataTypeKind::Primitive));

        let mut conventions = Conventions::default();
        conventions.data_types.category = "VALUE".to_string();
        let mut t = Transformer::new(m, TargetModel::new(), conventions);
        t.run();

        let data_type = t.target().of_kind(TargetKind::ImplementationDataType)[0];
        assert_eq!(
            t.target().property(data_type, Property::Category),
            Some(&PropertyValue::Text("VALUE".into()))
        );
    }

    #[test]
    fn test_primitive_and_typedef_structure() {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        let uint8 = m.add(pkg, "uint8", SourceKind::DataType(DataTypeKind::Primitive));
        let speed = m.add(pkg, "Speed_T", SourceKind::DataType(DataTypeKind::Typedef { base: Some(uint8) }));
        m.tag(speed, "unit", TagValue::Text("km_per_h".into()));
        m.add(pkg, "Raw_T", SourceKind::DataType(DataTypeKind::Typedef { base: None }));

        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
        t.run();
        let target = t.target();

        let types = target.of_kind(TargetKind::ImplementationDataType);
        for data_type in &types {
            assert_eq!(
                target.property(*data_type, Property::Category),
                Some(&PropertyValue::Text("STRING".into()))
            );
        }
        let conditional_of = |id| {
            let props = target.reference(id, Reference::SwDataDefProps).unwrap();
            target.children(props, Collection::SwDataDefPropsVariants)[0]
        };

        let base = target.reference(conditional_of(types[0]), Reference::BaseType).unwrap();
        assert_eq!(target.short_name(base), Some("sbt_uint8"));
        let unit = target.reference(conditional_of(types[1]), Reference::Unit).unwrap();
        assert_eq!(target.short_name(unit), Some("km_per_h"));
        assert!(t
            .diagnostics()
            .entries()
            .iter()
            .any(|d| d.rule == "data-type" && d.message.contains("Raw_T")));
    }

    #[test]
    fn test_arguments_and_data_elements_are_typed() {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        let uint8 = m.add(pkg, "uint8", SourceKind::DataType(DataTypeKind::Primitive));

        let cs = m.add(pkg, "IStart", SourceKind::Interface);
        let start = m.add(cs, "Start", SourceKind::Operation);
        m.stereotype(start, "operationWevent");
        m.add(start, "mode", SourceKind::Argument { type_ref: Some(uint8), direction: ArgumentDirection::InOut });

        let holder = m.add(pkg, "Vehicle", SourceKind::Block);
        let velocity = m.add(holder, "velocity", SourceKind::Attribute { is_static: false, type_ref: Some(uint8) });
        m.stereotype(velocity, "flowProperty");

        let sr = m.add(pkg, "ISpeed", SourceKind::Interface);
        let speed = m.add(sr, "speed", SourceKind::Operation);
        m.stereotype(speed, "operationWdata")
            .tag(speed, "dataReceived", TagValue::Element(velocity));

        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
        t.run();
        let target = t.target();
        let data_type = target.of_kind(TargetKind::ImplementationDataType)[0];

        let argument = target.of_kind(TargetKind::ArgumentDataPrototype)[0];
        assert_eq!(target.reference(argument, Reference::Type), Some(data_type));
        assert_eq!(
            target.property(argument, Property::Direction),
            Some(&PropertyValue::Text("INOUT".into()))
        );

        let interfaces = target.of_kind(TargetKind::SenderReceiverInterface);
        let holder_interface = interfaces
            .iter()
            .copied()
            .find(|i| target.short_name(*i) == Some("SRI_Vehicle"))
            .unwrap();
        let flow = target.children(holder_interface, Collection::DataElements)[0];
        assert_eq!(target.short_name(flow), Some("velocity"));
        assert_eq!(target.reference(flow, Reference::Type), Some(data_type));

        let speed_interface = interfaces
            .iter()
            .copied()
            .find(|i| target.short_name(*i) == Some("ISpeed"))
            .unwrap();
        let element = target.children(speed_interface, Collection::DataElements)[0];
        assert_eq!(target.short_name(element), Some("velocity_speed"));
        assert_eq!(target.reference(element, Reference::Type), Some(data_type));
    }
}
