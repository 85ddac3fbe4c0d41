use crate::core::diagnostics::Diagnostic;
use crate::domain::target::{TargetId, TargetModel};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TransformReport {
    pub generated_at: DateTime<Utc>,
    pub source_elements: usize,
    pub created: usize,
    pub placed: usize,
    pub enriched: usize,
    pub aborted: usize,
    pub warnings: usize,
    pub severe: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FindingKind {
    /// Created but never completed placement or enrichment.
    Incomplete,
    PortWithoutInterface,
    InvalidShortName,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditFinding {
    pub node: TargetId,
    pub kind: FindingKind,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransformOutput {
    pub target: TargetModel,
    pub report: TransformReport,
    pub diagnostics: Vec<Diagnostic>,
    pub findings: Vec<AuditFinding>,
}
