use crate::core::session::Transformer;
use crate::domain::model::{AuditFinding, FindingKind};
use crate::domain::ports::{SourceGraph, TargetGraph};
use crate::domain::target::Reference;
use crate::utils::validation::is_valid_short_name;
use tracing::warn;

impl<S: SourceGraph, T: TargetGraph> Transformer<S, T> {
    /// Post-run checks of the target model. Nothing is removed; incomplete
    /// nodes stay where their rule left them.
    pub fn audit(&self) -> Vec<AuditFinding> {
        let mut findings: Vec<AuditFinding> = self
            .in_progress
            .iter()
            .map(|node| AuditFinding {
                node: *node,
                kind: FindingKind::Incomplete,
                detail: format!(
                    "'{}' was created but its rule did not complete",
                    self.target.short_name(*node).unwrap_or_default()
                ),
            })
            .collect();

        for node in self.target.node_ids() {
            let Some(kind) = self.target.kind(node) else {
                continue;
            };
            if kind.is_port()
                && self.target.reference(node, Reference::ProvidedInterface).is_none()
                && self.target.reference(node, Reference::RequiredInterface).is_none()
            {
                findings.push(AuditFinding {
                    node,
                    kind: FindingKind::PortWithoutInterface,
                    detail: format!("{:?} '{}' references no interface", kind, self.target.short_name(node).unwrap_or_default()),
                });
            }
            if let Some(name) = self.target.short_name(node) {
                if !is_valid_short_name(name) {
                    findings.push(AuditFinding {
                        node,
                        kind: FindingKind::InvalidShortName,
                        detail: format!("'{}' is not a valid short name", name),
                    });
                }
            }
        }

        if !findings.is_empty() {
            warn!(findings = findings.len(), "audit found problems");
        }
        findings
    }
}
