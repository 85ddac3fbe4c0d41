use sysml2autosar::core::{Severity, SourceGraph, TargetGraph};
use sysml2autosar::domain::source::{DataTypeKind, LinkEnd, SourceId, SourceKind, TagValue};
use sysml2autosar::domain::target::{Collection, Property, PropertyValue, Reference, TargetKind};
use sysml2autosar::{Conventions, SourceModel, TargetModel, Transformer};

fn client_server_provider() -> (SourceModel, SourceId) {
    let mut m = SourceModel::new();
    let pkg = m.add_package("Pkg");
    let cs = m.add(pkg, "IStart", SourceKind::Interface);
    let start = m.add(cs, "Start", SourceKind::Operation);
    m.stereotype(start, "operationWevent");
    let ctrl = m.add(pkg, "Ctrl", SourceKind::SoftwareComponent);
    m.add(ctrl, "pStart", SourceKind::Port { provided: vec![cs], required: vec![] });
    (m, start)
}

#[test]
fn test_client_server_provider_scenario() {
    let (model, start) = client_server_provider();
    let mut t = Transformer::new(model, TargetModel::new(), Conventions::default());
    t.run();
    let target = t.target();

    assert_eq!(target.count_kind(TargetKind::PPortPrototype), 1);
    let port = target.of_kind(TargetKind::PPortPrototype)[0];
    let com_specs = target.children(port, Collection::ProvidedComSpecs);
    assert_eq!(com_specs.len(), 1);
    assert_eq!(target.kind(com_specs[0]), Some(TargetKind::ServerComSpec));
    assert_eq!(target.reference(com_specs[0], Reference::Operation), t.lookup(start));
    assert_eq!(target.count_kind(TargetKind::RunnableEntity), 0);

    let interface = target.reference(port, Reference::ProvidedInterface).unwrap();
    assert_eq!(target.short_name(interface), Some("IStart"));
    assert!(target
        .find_package(&["Pkg", "SoftwareTypes", "Interfaces"])
        .is_some_and(|pkg| target.children(pkg, Collection::Elements) == vec![interface]));
    assert!(t.diagnostics().is_empty());
}

#[test]
fn test_registry_round_trip() {
    let (model, _) = client_server_provider();
    let ids = model.ids();
    let mut t = Transformer::new(model, TargetModel::new(), Conventions::default());
    t.run();

    assert_eq!(t.registry().len(), ids.len());
    for id in ids {
        let node = t.lookup(id).unwrap();
        assert_eq!(t.registry().reverse_lookup(node), Some(id));
    }
    assert!(t
        .registry()
        .iter()
        .all(|(source, node)| t.registry().reverse_lookup(node) == Some(source)));
}

#[test]
fn test_enumeration_scales() {
    let mut m = SourceModel::new();
    let pkg = m.add_package("Pkg");
    let mode = m.add(pkg, "Mode", SourceKind::DataType(DataTypeKind::Enumeration));
    m.add(mode, "A", SourceKind::EnumerationLiteral { value: None });
    m.add(mode, "B", SourceKind::EnumerationLiteral { value: None });

    let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
    t.run();
    let target = t.target();

    let method = target.of_kind(TargetKind::CompuMethod)[0];
    let compu = target.reference(method, Reference::CompuInternalToPhys).unwrap();
    let scales: Vec<(i64, i64, String)> = target
        .children(compu, Collection::CompuScales)
        .into_iter()
        .map(|scale| {
            let int = |p| target.property(scale, p).and_then(PropertyValue::as_integer).unwrap();
            let vt = target.property(scale, Property::Vt).and_then(PropertyValue::as_text).unwrap();
            (int(Property::LowerLimit), int(Property::UpperLimit), vt.to_string())
        })
        .collect();
    assert_eq!(scales, vec![(0, 0, "A".to_string()), (1, 1, "B".to_string())]);
}

/// Sensor sends speed to Display; Starter calls Ctrl's Start, which is also
/// invoked by `evStart`; both run inside one composition.
#[test]
fn test_complete_system() {
    let mut m = SourceModel::new();
    let pkg = m.add_package("Vehicle");
    let speed_t = m.add(pkg, "Speed_T", SourceKind::DataType(DataTypeKind::Typedef { base: None }));
    SourceModel::tag(&mut m, speed_t, "unit", TagValue::Text("km_per_h".into()));

    let sr = m.add(pkg, "ISpeed", SourceKind::Interface);
    let speed = m.add(sr, "speed", SourceKind::Operation);
    m.stereotype(speed, "operationWdata");
    let cs = m.add(pkg, "IStart", SourceKind::Interface);
    let start = m.add(cs, "Start", SourceKind::Operation);
    m.stereotype(start, "operationWevent")
        .tag(start, "event", TagValue::Text("evStart".into()));
    m.add(pkg, "evStart", SourceKind::Event);

    let sensor = m.add(pkg, "Sensor", SourceKind::SoftwareComponent);
    let value = m.add(sensor, "value", SourceKind::Attribute { is_static: false, type_ref: Some(speed_t) });
    m.stereotype(value, "PIMProperty");
    SourceModel::tag(&mut m, speed, "dataReceived", TagValue::Element(value));
    let p_speed = m.add(sensor, "pSpeed", SourceKind::Port { provided: vec![], required: vec![sr] });
    let sample = m.add(sensor, "sample", SourceKind::Operation);
    m.stereotype(sample, "timingEvent")
        .tag(sample, "period", TagValue::Number(0.01));

    let display = m.add(pkg, "Display", SourceKind::SoftwareComponent);
    let r_speed = m.add(display, "rSpeed", SourceKind::Port { provided: vec![sr], required: vec![] });

    let ctrl = m.add(pkg, "Ctrl", SourceKind::SoftwareComponent);
    m.add(ctrl, "pStart", SourceKind::Port { provided: vec![cs], required: vec![] });
    m.add(ctrl, "onStart", SourceKind::Operation);

    let its_sensor = m.add(pkg, "itsSensor", SourceKind::Instance { of: Some(sensor) });
    let its_display = m.add(pkg, "itsDisplay", SourceKind::Instance { of: Some(display) });
    m.add(
        pkg,
        "speedLink",
        SourceKind::Link {
            from: LinkEnd { instance: its_sensor, port: p_speed },
            to: LinkEnd { instance: its_display, port: r_speed },
        },
    );

    let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
    let report = t.run();
    assert_eq!(report.severe, 0, "{:?}", t.diagnostics().entries());
    assert_eq!(report.aborted, 0);
    assert!(t.audit().is_empty());

    let target = t.target();
    let behaviors: Vec<&str> = target
        .of_kind(TargetKind::SwcInternalBehavior)
        .into_iter()
        .filter_map(|b| target.short_name(b))
        .collect();
    assert_eq!(behaviors, vec!["IB_Sensor", "IB_Display", "IB_Ctrl"]);

    let element = target.of_kind(TargetKind::VariableDataPrototype)[0];
    assert_eq!(target.short_name(element), Some("value_speed"));
    assert_eq!(target.count_kind(TargetKind::PerInstanceMemory), 1);
    assert_eq!(target.count_kind(TargetKind::DataReceivedEvent), 1);
    assert_eq!(target.count_kind(TargetKind::TimingEvent), 1);

    let invoked = target.of_kind(TargetKind::OperationInvokedEvent)[0];
    let runnable = target.reference(invoked, Reference::StartOnEvent).unwrap();
    assert_eq!(target.short_name(runnable), Some("pStart_onStart"));

    let composition = target.of_kind(TargetKind::CompositionSwComponentType)[0];
    assert_eq!(target.short_name(composition), Some("Sensor_Cmpstn"));
    assert_eq!(target.children(composition, Collection::Components).len(), 2);
    let connector = target.children(composition, Collection::Connectors)[0];
    assert!(target.reference(connector, Reference::Provider).is_some());
    assert!(target.reference(connector, Reference::Requester).is_some());

    assert_eq!(t.diagnostics().count(Severity::Warning), 0);
    assert_eq!(
        target.property(target.of_kind(TargetKind::ImplementationDataType)[0], Property::Category),
        Some(&PropertyValue::Text("STRING".into()))
    );
}
