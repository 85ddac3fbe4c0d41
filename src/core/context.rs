//! Locate-or-create helpers for canonical target containers, and placement
//! of bare nodes into them.
//!
//! Every `ensure_*` helper is idempotent: a second call with the same
//! arguments returns the node created by the first one.

use crate::core::classify::TargetShape;
use crate::core::session::Transformer;
use crate::domain::ports::{SourceGraph, TargetGraph};
use crate::domain::source::{SourceId, SourceKind};
use crate::domain::target::{Collection, Property, TargetId, TargetKind};
use crate::utils::error::{Result, TransformError};

pub const COMPONENT_TYPES: [&str; 2] = ["SoftwareTypes", "ComponentTypes"];
pub const INTERFACES: [&str; 2] = ["SoftwareTypes", "Interfaces"];
pub const IMPLEMENTATION_DATA_TYPES: [&str; 2] = ["DataTypes", "ImplementationDataTypes"];
pub const BASE_TYPES: [&str; 2] = ["DataTypes", "BaseTypes"];
pub const COMPU_METHODS: [&str; 2] = ["DataTypes", "CompuMethods"];
pub const UNITS: [&str; 2] = ["DataTypes", "Units"];

impl<S: SourceGraph, T: TargetGraph> Transformer<S, T> {
    /// Walk `segments` below `root`, creating each missing package.
    pub fn ensure_package_path(&mut self, root: TargetId, segments: &[&str]) -> Result<TargetId> {
        let mut current = root;
        for segment in segments {
            current = match self.target.find_child(current, Collection::ArPackages, segment) {
                Some(existing) => existing,
                None => {
                    let package = self.target.create_named(TargetKind::ArPackage, segment);
                    self.target.push_child(current, Collection::ArPackages, package)?;
                    package
                }
            };
        }
        Ok(current)
    }

    /// Non-creating variant of [`Transformer::ensure_package_path`].
    pub fn find_package_path(&self, root: TargetId, segments: &[&str]) -> Option<TargetId> {
        segments.iter().try_fold(root, |current, segment| {
            self.target.find_child(current, Collection::ArPackages, segment)
        })
    }

    /// Target package of the nearest source package enclosing `element`.
    pub fn package_root(&self, element: SourceId) -> Result<TargetId> {
        let package = self
            .source
            .owning_package(element)
            .ok_or_else(|| TransformError::NotFound {
                what: "owning package".to_string(),
                element: self.name_of(element),
            })?;
        self.counterpart(package, "ARPackage")
    }

    /// Named element of `kind` in the `Elements` of `package`, created on first use.
    pub fn ensure_element(&mut self, package: TargetId, kind: TargetKind, name: &str) -> Result<TargetId> {
        let existing = self
            .target
            .children(package, Collection::Elements)
            .into_iter()
            .find(|id| self.target.kind(*id) == Some(kind) && self.target.short_name(*id) == Some(name));
        if let Some(id) = existing {
            return Ok(id);
        }
        let element = self.target.create_named(kind, name);
        self.target.push_child(package, Collection::Elements, element)?;
        Ok(element)
    }

    pub fn ensure_internal_behavior(&mut self, component: TargetId) -> Result<TargetId> {
        if let Some(existing) = self
            .target
            .children(component, Collection::InternalBehaviors)
            .first()
        {
            return Ok(*existing);
        }
        let name = format!(
            "{}{}",
            self.conventions.naming.internal_behavior_prefix,
            self.target.short_name(component).unwrap_or_default()
        );
        let behavior = self.target.create_named(TargetKind::SwcInternalBehavior, &name);
        self.target
            .set_property(behavior, Property::SupportsMultipleInstantiation, false)?;
        self.target
            .push_child(component, Collection::InternalBehaviors, behavior)?;
        Ok(behavior)
    }

    /// Internal behavior of the component owning `element`.
    pub fn behavior_of_owner(&mut self, element: SourceId) -> Result<TargetId> {
        let owner = self.source.owner(element).ok_or_else(|| TransformError::NotFound {
            what: "owning component".to_string(),
            element: self.name_of(element),
        })?;
        let component = self.counterpart(owner, "ApplicationSwComponentType")?;
        self.ensure_internal_behavior(component)
    }

    /// `<fromComponent>_Cmpstn` composition next to the from-port's component.
    pub fn ensure_composition(&mut self, link: SourceId) -> Result<TargetId> {
        let Some(SourceKind::Link { from, .. }) = self.source.kind(link).cloned() else {
            return Err(TransformError::NotFound {
                what: "link endpoints".to_string(),
                element: self.name_of(link),
            });
        };
        let block = self.source.owner(from.port).ok_or_else(|| TransformError::NotFound {
            what: "component owning the from-port".to_string(),
            element: self.name_of(link),
        })?;
        let component = self.counterpart(block, "ApplicationSwComponentType")?;
        let package = self
            .target
            .container(component)
            .ok_or(TransformError::UnknownTargetNode(component))?;
        let name = format!("{}{}", self.source.name(block), self.conventions.naming.composition_suffix);
        self.ensure_element(package, TargetKind::CompositionSwComponentType, &name)
    }

    /// `SRI_<block>` interface collecting the flow properties of the attribute's owner.
    pub fn ensure_data_holder(&mut self, attribute: SourceId) -> Result<TargetId> {
        let block = self.source.owner(attribute).ok_or_else(|| TransformError::NotFound {
            what: "owning block".to_string(),
            element: self.name_of(attribute),
        })?;
        let root = self.package_root(block)?;
        let interfaces = self.ensure_package_path(root, &INTERFACES)?;
        let name = format!("{}{}", self.conventions.naming.data_holder_prefix, self.source.name(block));
        self.ensure_element(interfaces, TargetKind::SenderReceiverInterface, &name)
    }

    pub fn ensure_unit(&mut self, root: TargetId, name: &str) -> Result<TargetId> {
        let units = self.ensure_package_path(root, &UNITS)?;
        self.ensure_element(units, TargetKind::Unit, name)
    }

    pub fn ensure_base_type(&mut self, root: TargetId, type_name: &str) -> Result<TargetId> {
        let base_types = self.ensure_package_path(root, &BASE_TYPES)?;
        let name = format!("{}{}", self.conventions.naming.base_type_prefix, type_name);
        self.ensure_element(base_types, TargetKind::SwBaseType, &name)
    }

    fn owner_counterpart(&self, element: SourceId, expected: &str) -> Result<TargetId> {
        let owner = self.source.owner(element).ok_or_else(|| TransformError::NotFound {
            what: format!("owner for the {}", expected),
            element: self.name_of(element),
        })?;
        self.counterpart(owner, expected)
    }

    /// First link of the instance's package that has `instance` as an endpoint.
    fn link_of_instance(&self, instance: SourceId) -> Option<SourceId> {
        let package = self.source.owner(instance)?;
        self.source.links(package).into_iter().find(|link| {
            matches!(
                self.source.kind(*link),
                Some(SourceKind::Link { from, to }) if from.instance == instance || to.instance == instance
            )
        })
    }

    /// Attach the bare node created for `source` to its canonical container.
    /// Shapes whose container depends on enrichment are left alone here.
    pub fn place(&mut self, shape: TargetShape, source: SourceId, target: TargetId) -> Result<()> {
        match shape {
            TargetShape::RootPackage => {
                let parent = self
                    .source
                    .owner(source)
                    .and_then(|owner| self.registry.lookup(owner))
                    .filter(|parent| self.target.kind(*parent) == Some(TargetKind::ArPackage));
                match parent {
                    Some(parent) => self.target.push_child(parent, Collection::ArPackages, target)?,
                    None => self.target.add_root(target),
                }
            }
            TargetShape::SenderReceiverInterface | TargetShape::ClientServerInterface => {
                let root = self.package_root(source)?;
                let package = self.ensure_package_path(root, &INTERFACES)?;
                self.target.push_child(package, Collection::Elements, target)?;
            }
            TargetShape::ApplicationComponent => {
                let root = self.package_root(source)?;
                let package = self.ensure_package_path(root, &COMPONENT_TYPES)?;
                self.target.push_child(package, Collection::Elements, target)?;
            }
            TargetShape::ImplementationDataType => {
                let root = self.package_root(source)?;
                let package = self.ensure_package_path(root, &IMPLEMENTATION_DATA_TYPES)?;
                self.target.push_child(package, Collection::Elements, target)?;
            }
            TargetShape::ClientServerOperation => {
                let interface = self.owner_counterpart(source, "ClientServerInterface")?;
                self.target.push_child(interface, Collection::Operations, target)?;
            }
            TargetShape::DataElement | TargetShape::ReceptionDataElement => {
                let interface = self.owner_counterpart(source, "SenderReceiverInterface")?;
                self.target.push_child(interface, Collection::DataElements, target)?;
            }
            TargetShape::ClientServerArgument => {
                let operation = self.owner_counterpart(source, "ClientServerOperation")?;
                self.target.push_child(operation, Collection::Arguments, target)?;
            }
            TargetShape::FlowDataElement => {
                let holder = self.ensure_data_holder(source)?;
                self.target.push_child(holder, Collection::DataElements, target)?;
            }
            TargetShape::ProvidedPort | TargetShape::RequiredPort => {
                let component = self.owner_counterpart(source, "ApplicationSwComponentType")?;
                self.target.push_child(component, Collection::Ports, target)?;
            }
            TargetShape::ComponentPrototype => {
                let link = self.link_of_instance(source).ok_or_else(|| TransformError::NotFound {
                    what: "link using the instance".to_string(),
                    element: self.name_of(source),
                })?;
                let composition = self.ensure_composition(link)?;
                let name = format!(
                    "{}{}",
                    self.conventions.naming.component_prototype_prefix,
                    self.source.name(source)
                );
                self.target.set_short_name(target, &name)?;
                self.target.push_child(composition, Collection::Components, target)?;
            }
            TargetShape::AssemblyConnector => {
                let composition = self.ensure_composition(source)?;
                self.target.push_child(composition, Collection::Connectors, target)?;
            }
            TargetShape::SenderReceiverArgument
            | TargetShape::Runnable
            | TargetShape::TimingEvent
            | TargetShape::OperationInvokedEvent
            | TargetShape::InterRunnableVariable
            | TargetShape::PerInstanceMemory
            | TargetShape::CalibrationParameter => {}
        }
        Ok(())
    }
}
