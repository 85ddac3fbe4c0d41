//! In-memory source graph: packages, classifiers, ports, interface items and
//! links of a SysML-style architecture model.

use crate::domain::ports::SourceGraph;
use crate::utils::error::{Result, TransformError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "src#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArgumentDirection {
    #[default]
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataTypeKind {
    Primitive,
    Enumeration,
    Typedef { base: Option<SourceId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEnd {
    pub instance: SourceId,
    pub port: SourceId,
}

/// Element category. Replaces meta-class string comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceKind {
    Package,
    Interface,
    SoftwareComponent,
    Block,
    DataType(DataTypeKind),
    EnumerationLiteral {
        #[serde(default)]
        value: Option<i64>,
    },
    Operation,
    EventReception {
        event: SourceId,
    },
    Event,
    Port {
        #[serde(default)]
        provided: Vec<SourceId>,
        #[serde(default)]
        required: Vec<SourceId>,
    },
    Attribute {
        #[serde(default)]
        is_static: bool,
        #[serde(default)]
        type_ref: Option<SourceId>,
    },
    Argument {
        #[serde(default)]
        type_ref: Option<SourceId>,
        #[serde(default)]
        direction: ArgumentDirection,
    },
    Instance {
        #[serde(default)]
        of: Option<SourceId>,
    },
    Link {
        from: LinkEnd,
        to: LinkEnd,
    },
}

impl SourceKind {
    pub fn is_classifier(&self) -> bool {
        matches!(
            self,
            SourceKind::Interface | SourceKind::SoftwareComponent | SourceKind::Block
        )
    }

    pub fn is_interface_item(&self) -> bool {
        matches!(self, SourceKind::Operation | SourceKind::EventReception { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Package => "Package",
            SourceKind::Interface => "Interface",
            SourceKind::SoftwareComponent => "SoftwareComponent",
            SourceKind::Block => "Block",
            SourceKind::DataType(_) => "DataType",
            SourceKind::EnumerationLiteral { .. } => "EnumerationLiteral",
            SourceKind::Operation => "Operation",
            SourceKind::EventReception { .. } => "EventReception",
            SourceKind::Event => "Event",
            SourceKind::Port { .. } => "Port",
            SourceKind::Attribute { .. } => "Attribute",
            SourceKind::Argument { .. } => "Argument",
            SourceKind::Instance { .. } => "Instance",
            SourceKind::Link { .. } => "Link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Text(String),
    Number(f64),
    Element(SourceId),
}

impl TagValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            TagValue::Number(n) => Some(*n),
            TagValue::Text(text) => text.trim().parse().ok(),
            TagValue::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<SourceId> {
        match self {
            TagValue::Element(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceElement {
    pub id: SourceId,
    pub name: String,
    #[serde(default)]
    pub owner: Option<SourceId>,
    pub kind: SourceKind,
    #[serde(default)]
    pub stereotypes: Vec<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, TagValue>,
    #[serde(default, skip_serializing)]
    pub children: Vec<SourceId>,
}

/// Arena-backed source model. Element ids are their index in `elements`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceModel {
    elements: Vec<SourceElement>,
}

impl SourceModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from deserialized elements, rebuilding child lists from owners.
    pub fn from_elements(elements: Vec<SourceElement>) -> Result<Self> {
        let mut model = Self { elements };
        model.reindex();
        model.validate()?;
        Ok(model)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let model: SourceModel = serde_json::from_slice(bytes)?;
        Self::from_elements(model.elements)
    }

    fn reindex(&mut self) {
        for element in &mut self.elements {
            element.children.clear();
        }
        let links: Vec<(usize, SourceId)> = self
            .elements
            .iter()
            .filter_map(|e| e.owner.map(|owner| (owner.0 as usize, e.id)))
            .collect();
        for (owner, child) in links {
            if let Some(parent) = self.elements.get_mut(owner) {
                parent.children.push(child);
            }
        }
    }

    pub fn add_package(&mut self, name: &str) -> SourceId {
        self.push(None, name, SourceKind::Package)
    }

    pub fn add(&mut self, owner: SourceId, name: &str, kind: SourceKind) -> SourceId {
        self.push(Some(owner), name, kind)
    }

    fn push(&mut self, owner: Option<SourceId>, name: &str, kind: SourceKind) -> SourceId {
        let id = SourceId(self.elements.len() as u32);
        self.elements.push(SourceElement {
            id,
            name: name.to_string(),
            owner,
            kind,
            stereotypes: Vec::new(),
            tags: BTreeMap::new(),
            children: Vec::new(),
        });
        if let Some(parent) = owner.and_then(|o| self.elements.get_mut(o.0 as usize)) {
            parent.children.push(id);
        }
        id
    }

    pub fn stereotype(&mut self, id: SourceId, stereotype: &str) -> &mut Self {
        if let Some(element) = self.elements.get_mut(id.0 as usize) {
            element.stereotypes.push(stereotype.to_string());
        }
        self
    }

    pub fn tag(&mut self, id: SourceId, name: &str, value: TagValue) -> &mut Self {
        if let Some(element) = self.elements.get_mut(id.0 as usize) {
            element.tags.insert(name.to_string(), value);
        }
        self
    }

    /// Replace an element's kind, e.g. to wire port interfaces after both ends exist.
    pub fn set_kind(&mut self, id: SourceId, kind: SourceKind) {
        if let Some(element) = self.elements.get_mut(id.0 as usize) {
            element.kind = kind;
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn check_ref(&self, at: &SourceElement, field: &str, id: SourceId) -> Result<()> {
        if (id.0 as usize) < self.elements.len() {
            Ok(())
        } else {
            Err(TransformError::ModelError {
                message: format!("{} '{}' references missing {} {}", at.kind.label(), at.name, field, id),
            })
        }
    }

    /// Every owner chain must end at a root element.
    fn check_owner_chains(&self) -> Result<()> {
        for element in &self.elements {
            let mut current = element.owner;
            let mut steps = 0;
            while let Some(owner) = current {
                if owner == element.id || steps >= self.elements.len() {
                    return Err(TransformError::ModelError {
                        message: format!("owner chain of {} '{}' contains a cycle", element.kind.label(), element.name),
                    });
                }
                steps += 1;
                current = self.elements.get(owner.0 as usize).and_then(|e| e.owner);
            }
        }
        Ok(())
    }
}

impl SourceGraph for SourceModel {
    fn element(&self, id: SourceId) -> Option<&SourceElement> {
        self.elements.get(id.0 as usize)
    }

    fn ids(&self) -> Vec<SourceId> {
        self.elements.iter().map(|e| e.id).collect()
    }
}

impl Validate for SourceModel {
    fn validate(&self) -> Result<()> {
        for (index, element) in self.elements.iter().enumerate() {
            if element.id.0 as usize != index {
                return Err(TransformError::ModelError {
                    message: format!("element '{}' has id {} at position {}", element.name, element.id, index),
                });
            }
            if let Some(owner) = element.owner {
                self.check_ref(element, "owner", owner)?;
            }
            match &element.kind {
                SourceKind::EventReception { event } => self.check_ref(element, "event", *event)?,
                SourceKind::Port { provided, required } => {
                    for id in provided.iter().chain(required) {
                        self.check_ref(element, "interface", *id)?;
                    }
                }
                SourceKind::Attribute { type_ref: Some(t), .. }
                | SourceKind::Argument { type_ref: Some(t), .. }
                | SourceKind::Instance { of: Some(t) }
                | SourceKind::DataType(DataTypeKind::Typedef { base: Some(t) }) => {
                    self.check_ref(element, "type", *t)?
                }
                SourceKind::Link { from, to } => {
                    for end in [from, to] {
                        self.check_ref(element, "instance", end.instance)?;
                        self.check_ref(element, "port", end.port)?;
                    }
                }
                _ => {}
            }
            for value in element.tags.values() {
                if let TagValue::Element(id) = value {
                    self.check_ref(element, "tag element", *id)?;
                }
            }
        }
        self.check_owner_chains()
    }
}
