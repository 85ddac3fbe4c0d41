use crate::core::diagnostics::Diagnostic;
use crate::core::session::Transformer;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{AuditFinding, TransformOutput, TransformReport};
use crate::domain::source::SourceModel;
use crate::domain::target::TargetModel;
use crate::utils::error::{Result, TransformError};
use serde::Serialize;
use std::path::Path;

pub const TARGET_FILE: &str = "target.json";
pub const REPORT_FILE: &str = "report.json";

#[derive(Serialize)]
struct ReportFile<'a> {
    report: &'a TransformReport,
    diagnostics: &'a [Diagnostic],
    findings: &'a [AuditFinding],
}

/// JSON source model in, JSON target model and run report out.
pub struct ModelPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ModelPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for ModelPipeline<S, C> {
    fn extract(&self) -> Result<SourceModel> {
        tracing::debug!("Reading source model from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path())?;
        SourceModel::from_json(&bytes)
    }

    fn transform(&self, model: SourceModel) -> Result<TransformOutput> {
        let mut transformer = Transformer::new(model, TargetModel::new(), self.config.conventions().clone());
        let report = transformer.run();
        let findings = transformer.audit();
        let (target, registry, diagnostics) = transformer.into_parts();
        tracing::debug!("{} source elements have a target counterpart", registry.len());

        if self.config.strict() && report.severe > 0 {
            return Err(TransformError::ModelError {
                message: format!("{} severe diagnostics in strict mode", report.severe),
            });
        }

        Ok(TransformOutput {
            target,
            report,
            diagnostics: diagnostics.into_entries(),
            findings,
        })
    }

    fn load(&self, output: TransformOutput) -> Result<String> {
        let target_path = self.output_file(TARGET_FILE);
        let report_path = self.output_file(REPORT_FILE);

        let target_json = output.target.to_json_pretty()?;
        self.storage.write_file(&target_path, target_json.as_bytes())?;

        let report = ReportFile {
            report: &output.report,
            diagnostics: &output.diagnostics,
            findings: &output.findings,
        };
        let report_json = serde_json::to_string_pretty(&report)?;
        self.storage.write_file(&report_path, report_json.as_bytes())?;

        tracing::debug!("Wrote {} target nodes", output.target.len());
        Ok(target_path)
    }
}
