use crate::core::session::Transformer;
use crate::domain::ports::{SourceGraph, TargetGraph};
use crate::domain::source::{LinkEnd, SourceId, SourceKind};
use crate::domain::target::{Collection, Reference, TargetId, TargetKind};
use crate::utils::error::{Result, TransformError};

impl<S: SourceGraph, T: TargetGraph> Transformer<S, T> {
    pub(crate) fn wire_component_prototype(&mut self, instance: SourceId) -> Result<()> {
        let prototype = self.counterpart(instance, "SwComponentPrototype")?;
        let Some(SourceKind::Instance { of: Some(classifier) }) = self.source.kind(instance).cloned() else {
            return Err(TransformError::NotFound {
                what: "instantiated component".to_string(),
                element: self.name_of(instance),
            });
        };
        let component = self.counterpart(classifier, "ApplicationSwComponentType")?;
        self.target.set_reference(prototype, Reference::Type, component)
    }

    pub(crate) fn wire_assembly_connector(&mut self, link: SourceId) -> Result<()> {
        let connector = self.counterpart(link, "AssemblySwConnector")?;
        let Some(SourceKind::Link { from, to }) = self.source.kind(link).cloned() else {
            return Err(TransformError::NotFound {
                what: "link endpoints".to_string(),
                element: self.name_of(link),
            });
        };
        let composition = match self.target.container(connector) {
            Some(composition) => composition,
            None => self.ensure_composition(link)?,
        };

        for end in [from, to] {
            self.connect_end(connector, composition, end)?;
        }
        Ok(())
    }

    /// `CtSt_<instance>` prototype in the composition, created and typed on first use.
    fn prototype_for(&mut self, composition: TargetId, end: LinkEnd) -> Result<TargetId> {
        let name = format!(
            "{}{}",
            self.conventions.naming.component_prototype_prefix,
            self.source.name(end.instance)
        );
        if let Some(existing) = self.target.find_child(composition, Collection::Components, &name) {
            return Ok(existing);
        }
        let block = self.source.owner(end.port).ok_or_else(|| TransformError::NotFound {
            what: "component owning the port".to_string(),
            element: self.name_of(end.port),
        })?;
        let component = self.counterpart(block, "ApplicationSwComponentType")?;
        let prototype = self.target.create_named(TargetKind::SwComponentPrototype, &name);
        self.target.set_reference(prototype, Reference::Type, component)?;
        self.target
            .push_child(composition, Collection::Components, prototype)?;
        Ok(prototype)
    }

    fn connect_end(&mut self, connector: TargetId, composition: TargetId, end: LinkEnd) -> Result<()> {
        let prototype = self.prototype_for(composition, end)?;
        let port = self.counterpart(end.port, "PortPrototype")?;

        if self.target.kind(port) == Some(TargetKind::PPortPrototype) {
            let instance_ref = self.target.create(TargetKind::PPortInCompositionInstanceRef);
            self.target
                .set_reference(instance_ref, Reference::TargetPPort, port)?;
            self.target
                .set_reference(instance_ref, Reference::ContextComponent, prototype)?;
            self.target
                .set_reference(connector, Reference::Provider, instance_ref)
        } else {
            let instance_ref = self.target.create(TargetKind::RPortInCompositionInstanceRef);
            self.target
                .set_reference(instance_ref, Reference::TargetRPort, port)?;
            self.target
                .set_reference(instance_ref, Reference::ContextComponent, prototype)?;
            self.target
                .set_reference(connector, Reference::Requester, instance_ref)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::toml_config::Conventions;
    use crate::core::diagnostics::Severity;
    use crate::core::session::Transformer;
    use crate::domain::ports::TargetGraph;
    use crate::domain::source::{LinkEnd, SourceKind, SourceModel};
    use crate::domain::target::{Collection, Reference, TargetKind, TargetModel};

    #[test]
    fn test_connector_links_provider_and_requester() {
        let mut m = SourceModel::new();
        let pkg = m.add_package("Pkg");
        let cs = m.add(pkg, "IStart", SourceKind::Interface);
        let start = m.add(cs, "Start", SourceKind::Operation);
        m.stereotype(start, "operationWevent");

        let server = m.add(pkg, "Server", SourceKind::SoftwareComponent);
        let p_start = m.add(server, "pStart", SourceKind::Port { provided: vec![cs], required: vec![] });
        let client = m.add(pkg, "Client", SourceKind::SoftwareComponent);
        let r_start = m.add(client, "rStart", SourceKind::Port { provided: vec![], required: vec![cs] });

        let its_server = m.add(pkg, "itsServer", SourceKind::Instance { of: Some(server) });
        let its_client = m.add(pkg, "itsClient", SourceKind::Instance { of: Some(client) });
        m.add(pkg, "itsSpare", SourceKind::Instance { of: Some(client) });
        m.add(
            pkg,
            "link",
            SourceKind::Link {
                from: LinkEnd { instance: its_server, port: p_start },
                to: LinkEnd { instance: its_client, port: r_start },
            },
        );

        let mut t = Transformer::new(m, TargetModel::new(), Conventions::default());
        t.run();
        let target = t.target();

        let composition = target.of_kind(TargetKind::CompositionSwComponentType)[0];
        assert_eq!(target.short_name(composition), Some("Server_Cmpstn"));
        let components = target.children(composition, Collection::Components);
        let names: Vec<&str> = components.iter().filter_map(|c| target.short_name(*c)).collect();
        assert_eq!(names, vec!["CtSt_itsServer", "CtSt_itsClient"]);

        let server_type = target.of_kind(TargetKind::ApplicationSwComponentType)[0];
        assert_eq!(target.reference(components[0], Reference::Type), Some(server_type));

        let connector = target.children(composition, Collection::Connectors)[0];
        let provider = target.reference(connector, Reference::Provider).unwrap();
        let requester = target.reference(connector, Reference::Requester).unwrap();
        let p_port = target.of_kind(TargetKind::PPortPrototype)[0];
        let r_port = target.of_kind(TargetKind::RPortPrototype)[0];
        assert_eq!(target.reference(provider, Reference::TargetPPort), Some(p_port));
        assert_eq!(target.reference(provider, Reference::ContextComponent), Some(components[0]));
        assert_eq!(target.reference(requester, Reference::TargetRPort), Some(r_port));
        assert_eq!(target.reference(requester, Reference::ContextComponent), Some(components[1]));

        assert_eq!(target.count_kind(TargetKind::SwComponentPrototype), 2);
        assert_eq!(t.diagnostics().count(Severity::Severe), 0);
    }
}
