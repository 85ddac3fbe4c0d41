//! Reference driver: classify, create, register and place every source
//! element, then run the enrichment rule of every placed node.

use crate::core::classify::TargetShape;
use crate::core::session::{RuleOutcome, Transformer};
use crate::core::diagnostics::Severity;
use crate::domain::model::TransformReport;
use crate::domain::ports::{SourceGraph, TargetGraph};
use crate::domain::source::{SourceId, SourceKind};
use chrono::Utc;
use tracing::{debug, info};

/// Processing rank of an element. Containers are created before their
/// contents, and anything a rule resolves through the registry is created
/// before the rule runs.
fn rank<S: SourceGraph>(source: &S, id: SourceId) -> (u8, usize) {
    let owner_kind = source.owner(id).and_then(|owner| source.kind(owner));
    let category = match source.kind(id) {
        Some(SourceKind::Package) => return (0, depth(source, id)),
        Some(SourceKind::DataType(_)) | Some(SourceKind::EnumerationLiteral { .. }) => 1,
        Some(SourceKind::Interface) => 2,
        Some(SourceKind::Operation) | Some(SourceKind::EventReception { .. })
            if matches!(owner_kind, Some(SourceKind::Interface)) =>
        {
            3
        }
        Some(SourceKind::Argument { .. }) => 4,
        Some(SourceKind::SoftwareComponent) | Some(SourceKind::Block) => 5,
        Some(SourceKind::Attribute { .. }) => 6,
        Some(SourceKind::Operation) | Some(SourceKind::EventReception { .. }) => 7,
        Some(SourceKind::Port { .. }) => 8,
        Some(SourceKind::Event) => 9,
        Some(SourceKind::Instance { .. }) => 10,
        Some(SourceKind::Link { .. }) | None => 11,
    };
    (category, 0)
}

fn depth<S: SourceGraph>(source: &S, id: SourceId) -> usize {
    std::iter::successors(source.owner(id), |owner| source.owner(*owner)).count()
}

impl<S: SourceGraph, T: TargetGraph> Transformer<S, T> {
    /// Source ids in processing order. The sort is stable, so model order
    /// decides within a rank.
    pub fn processing_order(&self) -> Vec<SourceId> {
        let mut ids = self.source.ids();
        ids.sort_by_key(|id| rank(&self.source, *id));
        ids
    }

    pub fn run(&mut self) -> TransformReport {
        let order = self.processing_order();
        info!(elements = order.len(), "starting transformation");

        let mut created = 0;
        let mut placed: Vec<(SourceId, TargetShape)> = Vec::new();
        for id in &order {
            let Some(shape) = self.classifier().classify(*id) else {
                continue;
            };
            let name = self.name_of(*id);
            let node = self.target.create_named(shape.target_kind(), &name);
            created += 1;

            if let Err(err) = self.register(*id, node) {
                self.diagnostics.severe("registry", err.to_string());
                continue;
            }
            match self.place(shape, *id, node) {
                Ok(()) => {
                    debug!(element = %name, ?shape, "placed");
                    placed.push((*id, shape));
                }
                Err(err) => self
                    .diagnostics
                    .severe("placement", format!("'{}': {}", name, err)),
            }
        }
        info!(created, placed = placed.len(), "phase 1 complete");

        let mut enriched = 0;
        let mut aborted = 0;
        for (id, shape) in &placed {
            match shape.enrichment() {
                Some(rule) => match self.enrich(rule, *id) {
                    RuleOutcome::Applied => enriched += 1,
                    RuleOutcome::Aborted => aborted += 1,
                },
                None => {
                    if let Some(node) = self.registry.lookup(*id) {
                        self.mark_complete(node);
                    }
                }
            }
        }

        let report = TransformReport {
            generated_at: Utc::now(),
            source_elements: order.len(),
            created,
            placed: placed.len(),
            enriched,
            aborted,
            warnings: self.diagnostics.count(Severity::Warning),
            severe: self.diagnostics.count(Severity::Severe),
        };
        info!(
            enriched = report.enriched,
            aborted = report.aborted,
            warnings = report.warnings,
            severe = report.severe,
            "transformation finished"
        );
        report
    }
}
