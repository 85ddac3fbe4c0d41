use crate::config::toml_config::Conventions;
use crate::domain::model::TransformOutput;
use crate::domain::source::{SourceElement, SourceId, SourceKind, SourceModel, TagValue};
use crate::domain::target::{Collection, Property, PropertyValue, Reference, TargetId, TargetKind, TargetNode};
use crate::utils::error::{Result, TransformError};

/// Read-only view of the architecture model being transformed.
///
/// Implementors only provide element lookup; navigation is derived.
pub trait SourceGraph {
    fn element(&self, id: SourceId) -> Option<&SourceElement>;

    /// Every element id, in model order.
    fn ids(&self) -> Vec<SourceId>;

    fn name(&self, id: SourceId) -> &str {
        self.element(id).map(|e| e.name.as_str()).unwrap_or("")
    }

    fn kind(&self, id: SourceId) -> Option<&SourceKind> {
        self.element(id).map(|e| &e.kind)
    }

    fn owner(&self, id: SourceId) -> Option<SourceId> {
        self.element(id).and_then(|e| e.owner)
    }

    fn children(&self, id: SourceId) -> Vec<SourceId> {
        self.element(id).map(|e| e.children.clone()).unwrap_or_default()
    }

    fn children_where<F>(&self, id: SourceId, keep: F) -> Vec<SourceId>
    where
        F: Fn(&SourceKind) -> bool,
    {
        self.children(id)
            .into_iter()
            .filter(|child| self.kind(*child).map(&keep).unwrap_or(false))
            .collect()
    }

    /// Operations and event receptions of a classifier.
    fn interface_items(&self, id: SourceId) -> Vec<SourceId> {
        self.children_where(id, SourceKind::is_interface_item)
    }

    fn operations(&self, id: SourceId) -> Vec<SourceId> {
        self.children_where(id, |k| matches!(k, SourceKind::Operation))
    }

    fn ports(&self, id: SourceId) -> Vec<SourceId> {
        self.children_where(id, |k| matches!(k, SourceKind::Port { .. }))
    }

    fn attributes(&self, id: SourceId) -> Vec<SourceId> {
        self.children_where(id, |k| matches!(k, SourceKind::Attribute { .. }))
    }

    fn arguments(&self, id: SourceId) -> Vec<SourceId> {
        self.children_where(id, |k| matches!(k, SourceKind::Argument { .. }))
    }

    fn classes(&self, package: SourceId) -> Vec<SourceId> {
        self.children_where(package, SourceKind::is_classifier)
    }

    fn links(&self, package: SourceId) -> Vec<SourceId> {
        self.children_where(package, |k| matches!(k, SourceKind::Link { .. }))
    }

    fn enumeration_literals(&self, id: SourceId) -> Vec<SourceId> {
        self.children_where(id, |k| matches!(k, SourceKind::EnumerationLiteral { .. }))
    }

    fn has_stereotype(&self, id: SourceId, stereotype: &str) -> bool {
        self.element(id)
            .map(|e| e.stereotypes.iter().any(|s| s == stereotype))
            .unwrap_or(false)
    }

    fn tag(&self, id: SourceId, name: &str) -> Option<&TagValue> {
        self.element(id).and_then(|e| e.tags.get(name))
    }

    fn provided_interfaces(&self, port: SourceId) -> Vec<SourceId> {
        match self.kind(port) {
            Some(SourceKind::Port { provided, .. }) => provided.clone(),
            _ => Vec::new(),
        }
    }

    fn required_interfaces(&self, port: SourceId) -> Vec<SourceId> {
        match self.kind(port) {
            Some(SourceKind::Port { required, .. }) => required.clone(),
            _ => Vec::new(),
        }
    }

    fn reception_event(&self, reception: SourceId) -> Option<SourceId> {
        match self.kind(reception) {
            Some(SourceKind::EventReception { event }) => Some(*event),
            _ => None,
        }
    }

    /// Declared type of an attribute or argument.
    fn type_of(&self, id: SourceId) -> Option<SourceId> {
        match self.kind(id) {
            Some(SourceKind::Attribute { type_ref, .. }) | Some(SourceKind::Argument { type_ref, .. }) => *type_ref,
            _ => None,
        }
    }

    /// Nearest enclosing package, excluding the element itself.
    fn owning_package(&self, id: SourceId) -> Option<SourceId> {
        let mut current = self.owner(id);
        while let Some(candidate) = current {
            if matches!(self.kind(candidate), Some(SourceKind::Package)) {
                return Some(candidate);
            }
            current = self.owner(candidate);
        }
        None
    }
}

/// Node factory and generic accessors of the model under construction.
pub trait TargetGraph {
    fn create(&mut self, kind: TargetKind) -> TargetId;

    fn node(&self, id: TargetId) -> Option<&TargetNode>;

    fn node_mut(&mut self, id: TargetId) -> Option<&mut TargetNode>;

    fn roots(&self) -> Vec<TargetId>;

    /// Every node id, in creation order.
    fn node_ids(&self) -> Vec<TargetId>;

    fn add_root(&mut self, id: TargetId);

    fn create_named(&mut self, kind: TargetKind, name: &str) -> TargetId {
        let id = self.create(kind);
        if let Some(node) = self.node_mut(id) {
            node.short_name = Some(name.to_string());
        }
        id
    }

    fn kind(&self, id: TargetId) -> Option<TargetKind> {
        self.node(id).map(|n| n.kind)
    }

    fn short_name(&self, id: TargetId) -> Option<&str> {
        self.node(id).and_then(|n| n.short_name.as_deref())
    }

    fn set_short_name(&mut self, id: TargetId, name: &str) -> Result<()> {
        let node = self.node_mut(id).ok_or(TransformError::UnknownTargetNode(id))?;
        node.short_name = Some(name.to_string());
        Ok(())
    }

    fn container(&self, id: TargetId) -> Option<TargetId> {
        self.node(id).and_then(|n| n.container)
    }

    fn children(&self, id: TargetId, collection: Collection) -> Vec<TargetId> {
        self.node(id)
            .and_then(|n| n.children.get(&collection).cloned())
            .unwrap_or_default()
    }

    /// Append `child` to `collection` of `parent` and record the container.
    fn push_child(&mut self, parent: TargetId, collection: Collection, child: TargetId) -> Result<()> {
        if self.node(child).is_none() {
            return Err(TransformError::UnknownTargetNode(child));
        }
        let node = self.node_mut(parent).ok_or(TransformError::UnknownTargetNode(parent))?;
        node.children.entry(collection).or_default().push(child);
        if let Some(node) = self.node_mut(child) {
            node.container = Some(parent);
        }
        Ok(())
    }

    fn contains_child(&self, parent: TargetId, collection: Collection, child: TargetId) -> bool {
        self.children(parent, collection).contains(&child)
    }

    /// First child of `collection` whose short name equals `name`.
    fn find_child(&self, parent: TargetId, collection: Collection, name: &str) -> Option<TargetId> {
        self.children(parent, collection)
            .into_iter()
            .find(|child| self.short_name(*child) == Some(name))
    }

    fn reference(&self, id: TargetId, role: Reference) -> Option<TargetId> {
        self.node(id).and_then(|n| n.references.get(&role).copied())
    }

    fn set_reference(&mut self, id: TargetId, role: Reference, target: TargetId) -> Result<()> {
        let node = self.node_mut(id).ok_or(TransformError::UnknownTargetNode(id))?;
        node.references.insert(role, target);
        Ok(())
    }

    fn property(&self, id: TargetId, property: Property) -> Option<&PropertyValue> {
        self.node(id).and_then(|n| n.properties.get(&property))
    }

    fn set_property<V: Into<PropertyValue>>(&mut self, id: TargetId, property: Property, value: V) -> Result<()> {
        let node = self.node_mut(id).ok_or(TransformError::UnknownTargetNode(id))?;
        node.properties.insert(property, value.into());
        Ok(())
    }
}

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn conventions(&self) -> &Conventions;
    fn strict(&self) -> bool;
}

pub trait Pipeline {
    fn extract(&self) -> Result<SourceModel>;
    fn transform(&self, model: SourceModel) -> Result<TransformOutput>;
    fn load(&self, output: TransformOutput) -> Result<String>;
}
