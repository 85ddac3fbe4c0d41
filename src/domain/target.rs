//! In-memory target graph of AUTOSAR-style software component elements.
//!
//! Nodes are untyped containers: any node may hold any child collection,
//! reference or property. Shape correctness is the responsibility of the
//! transformation rules that build it.

use crate::domain::ports::TargetGraph;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ar#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TargetKind {
    ArPackage,
    ApplicationSwComponentType,
    CompositionSwComponentType,
    SwcInternalBehavior,
    RunnableEntity,
    PPortPrototype,
    RPortPrototype,
    SenderReceiverInterface,
    ClientServerInterface,
    ClientServerOperation,
    ArgumentDataPrototype,
    VariableDataPrototype,
    ParameterDataPrototype,
    PerInstanceMemory,
    DataReceivedEvent,
    TimingEvent,
    OperationInvokedEvent,
    NonqueuedReceiverComSpec,
    NonqueuedSenderComSpec,
    ClientComSpec,
    ServerComSpec,
    SynchronousServerCallPoint,
    VariableAccess,
    AutosarVariableRef,
    VariableInAtomicSwcTypeInstanceRef,
    RVariableInAtomicSwcInstanceRef,
    ROperationInAtomicSwcInstanceRef,
    POperationInAtomicSwcInstanceRef,
    NumericalValueSpecification,
    SwComponentPrototype,
    AssemblySwConnector,
    PPortInCompositionInstanceRef,
    RPortInCompositionInstanceRef,
    ImplementationDataType,
    SwBaseType,
    SwDataDefProps,
    SwDataDefPropsConditional,
    CompuMethod,
    Compu,
    CompuScale,
    Unit,
}

impl TargetKind {
    pub fn is_port(self) -> bool {
        matches!(self, TargetKind::PPortPrototype | TargetKind::RPortPrototype)
    }
}

/// Named child collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Collection {
    ArPackages,
    Elements,
    InternalBehaviors,
    Ports,
    Runnables,
    Events,
    PerInstanceMemories,
    PerInstanceParameters,
    ExplicitInterRunnableVariables,
    RequiredComSpecs,
    ProvidedComSpecs,
    DataElements,
    Operations,
    Arguments,
    DataReadAccesses,
    DataSendPoints,
    ServerCallPoints,
    Components,
    Connectors,
    SwDataDefPropsVariants,
    CompuScales,
}

/// Single-valued cross references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Reference {
    ProvidedInterface,
    RequiredInterface,
    DataElement,
    Operation,
    InitValue,
    StartOnEvent,
    Data,
    ContextRPort,
    ContextPPort,
    TargetDataElement,
    TargetRequiredOperation,
    TargetProvidedOperation,
    AccessedVariable,
    AutosarVariable,
    PortPrototype,
    TargetDataPrototype,
    Type,
    Provider,
    Requester,
    TargetPPort,
    TargetRPort,
    ContextComponent,
    SwDataDefProps,
    CompuMethod,
    CompuInternalToPhys,
    Unit,
    ValueAxisDataType,
    BaseType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Property {
    Symbol,
    CanBeInvokedConcurrently,
    MinimumStartInterval,
    SupportsMultipleInstantiation,
    Timeout,
    Period,
    Category,
    Direction,
    ShortLabel,
    Value,
    LowerLimit,
    UpperLimit,
    IntervalType,
    Vt,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetNode {
    pub id: TargetId,
    pub kind: TargetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<TargetId>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<Collection, Vec<TargetId>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub references: BTreeMap<Reference, TargetId>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<Property, PropertyValue>,
}

impl TargetNode {
    fn new(id: TargetId, kind: TargetKind) -> Self {
        Self {
            id,
            kind,
            short_name: None,
            container: None,
            children: BTreeMap::new(),
            references: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TargetModel {
    roots: Vec<TargetId>,
    nodes: Vec<TargetNode>,
}

impl TargetModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TargetNode> + '_ {
        self.nodes.iter()
    }

    pub fn count_kind(&self, kind: TargetKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    pub fn of_kind(&self, kind: TargetKind) -> Vec<TargetId> {
        self.nodes
            .iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.id)
            .collect()
    }

    /// Follow `ArPackages` children by short name from a root package.
    pub fn find_package(&self, path: &[&str]) -> Option<TargetId> {
        let (first, rest) = path.split_first()?;
        let mut current = *self
            .roots
            .iter()
            .find(|id| self.short_name(**id) == Some(*first))?;
        for segment in rest {
            current = self
                .children(current, Collection::ArPackages)
                .into_iter()
                .find(|id| self.short_name(*id) == Some(*segment))?;
        }
        Some(current)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl TargetGraph for TargetModel {
    fn create(&mut self, kind: TargetKind) -> TargetId {
        let id = TargetId(self.nodes.len() as u32);
        self.nodes.push(TargetNode::new(id, kind));
        id
    }

    fn node(&self, id: TargetId) -> Option<&TargetNode> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: TargetId) -> Option<&mut TargetNode> {
        self.nodes.get_mut(id.0 as usize)
    }

    fn roots(&self) -> Vec<TargetId> {
        self.roots.clone()
    }

    fn node_ids(&self) -> Vec<TargetId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    fn add_root(&mut self, id: TargetId) {
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_child_sets_container_and_preserves_order() {
        let mut t = TargetModel::new();
        let pkg = t.create_named(TargetKind::ArPackage, "Pkg");
        let a = t.create_named(TargetKind::ArPackage, "A");
        let b = t.create_named(TargetKind::ArPackage, "B");
        t.add_root(pkg);

        t.push_child(pkg, Collection::ArPackages, a).unwrap();
        t.push_child(pkg, Collection::ArPackages, b).unwrap();

        assert_eq!(t.children(pkg, Collection::ArPackages), vec![a, b]);
        assert_eq!(t.container(b), Some(pkg));
        assert_eq!(t.find_package(&["Pkg", "B"]), Some(b));
        assert_eq!(t.find_package(&["Pkg", "C"]), None);
    }

    #[test]
    fn test_helpers_report_unknown_nodes() {
        let mut t = TargetModel::new();
        assert!(t.set_short_name(TargetId(9), "x").is_err());
        assert!(t.set_reference(TargetId(9), Reference::Type, TargetId(0)).is_err());
    }
}
