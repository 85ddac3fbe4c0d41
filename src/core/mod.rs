pub mod audit;
pub mod classify;
pub mod context;
pub mod diagnostics;
pub mod driver;
pub mod engine;
mod enrich;
pub mod pipeline;
pub mod registry;
pub mod resolve;
pub mod session;

pub use crate::domain::model::{AuditFinding, FindingKind, TransformOutput, TransformReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, SourceGraph, Storage, TargetGraph};
pub use crate::utils::error::Result;
pub use classify::{Classifier, InterfaceKind, PortRole, TargetShape};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use registry::Correspondence;
pub use session::{Enrichment, RuleOutcome, Transformer};
