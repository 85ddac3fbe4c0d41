//! Structural enrichment rules. Each rule completes one freshly placed
//! target node by re-deriving its context through the registry.
//!
//! Rules return `Result<()>`; [`Transformer::enrich`] turns an error into a
//! severe diagnostic so that nothing propagates past a rule.

mod assembly;
mod behavior;
mod data;
mod ports;

use crate::core::session::Transformer;
use crate::domain::ports::{SourceGraph, TargetGraph};
use crate::domain::source::SourceId;
use crate::domain::target::{Collection, Property, Reference, TargetId, TargetKind};
use crate::utils::error::Result;

impl<S: SourceGraph, T: TargetGraph> Transformer<S, T> {
    /// Symbol and scheduling defaults of a runnable, from its current short name.
    pub(crate) fn complete_runnable(&mut self, runnable: TargetId) -> Result<()> {
        let symbol = self.target.short_name(runnable).unwrap_or_default().to_string();
        let defaults = self.conventions.runnable.clone();
        self.target.set_property(runnable, Property::Symbol, symbol)?;
        self.target.set_property(
            runnable,
            Property::CanBeInvokedConcurrently,
            defaults.can_be_invoked_concurrently,
        )?;
        self.target
            .set_property(runnable, Property::MinimumStartInterval, defaults.minimum_start_interval)?;
        Ok(())
    }

    pub(crate) fn new_runnable(&mut self, behavior: TargetId, name: &str) -> Result<TargetId> {
        let runnable = self.target.create_named(TargetKind::RunnableEntity, name);
        self.complete_runnable(runnable)?;
        self.target.push_child(behavior, Collection::Runnables, runnable)?;
        Ok(runnable)
    }

    pub(crate) fn numerical_value(&mut self) -> TargetId {
        self.target.create(TargetKind::NumericalValueSpecification)
    }

    /// Variable access through `port` to `data`, appended to `collection` of the runnable.
    pub(crate) fn variable_access(
        &mut self,
        runnable: TargetId,
        collection: Collection,
        name: &str,
        port: TargetId,
        data: TargetId,
    ) -> Result<TargetId> {
        let access = self.target.create_named(TargetKind::VariableAccess, name);
        self.target.push_child(runnable, collection, access)?;

        let variable_ref = self.target.create(TargetKind::AutosarVariableRef);
        self.target
            .set_reference(access, Reference::AccessedVariable, variable_ref)?;

        let instance_ref = self
            .target
            .create(TargetKind::VariableInAtomicSwcTypeInstanceRef);
        self.target
            .set_reference(instance_ref, Reference::PortPrototype, port)?;
        self.target
            .set_reference(instance_ref, Reference::TargetDataPrototype, data)?;
        self.target
            .set_reference(variable_ref, Reference::AutosarVariable, instance_ref)?;
        Ok(access)
    }

    /// Attach fresh data-definition properties to `owner`; returns the conditional variant.
    pub(crate) fn data_def_props(&mut self, owner: TargetId) -> Result<TargetId> {
        let props = self.target.create(TargetKind::SwDataDefProps);
        let conditional = self.target.create(TargetKind::SwDataDefPropsConditional);
        self.target
            .push_child(props, Collection::SwDataDefPropsVariants, conditional)?;
        self.target
            .set_reference(owner, Reference::SwDataDefProps, props)?;
        Ok(conditional)
    }

    /// Counterpart of a declared type; a missing declaration or counterpart is a warning.
    pub(crate) fn type_counterpart(
        &mut self,
        rule: &str,
        element: SourceId,
        type_ref: Option<SourceId>,
    ) -> Option<TargetId> {
        let Some(type_ref) = type_ref else {
            self.diagnostics
                .warning(rule, format!("'{}' declares no type", self.source.name(element)));
            return None;
        };
        let found = self.registry.lookup(type_ref);
        if found.is_none() {
            self.diagnostics.warning(
                rule,
                format!(
                    "no ImplementationDataType found for '{}' in '{}'",
                    self.source.name(type_ref),
                    self.source.name(element)
                ),
            );
        }
        found
    }

    /// Set `Type` on `target` from the declared type of `element`, if any.
    pub(crate) fn assign_type(&mut self, rule: &str, element: SourceId, target: TargetId) -> Result<()> {
        let type_ref = self.source.type_of(element);
        if let Some(data_type) = self.type_counterpart(rule, element, type_ref) {
            self.target.set_reference(target, Reference::Type, data_type)?;
        }
        Ok(())
    }

    /// Append `element` to the interface's data elements unless already there.
    pub(crate) fn append_data_element(&mut self, interface: TargetId, element: TargetId) -> Result<()> {
        if !self
            .target
            .contains_child(interface, Collection::DataElements, element)
        {
            self.target
                .push_child(interface, Collection::DataElements, element)?;
        }
        Ok(())
    }
}
