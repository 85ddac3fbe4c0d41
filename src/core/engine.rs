use crate::core::Pipeline;
use crate::utils::error::Result;
use tracing::info;

pub struct TransformEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> TransformEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<String> {
        info!("Starting model transformation...");

        info!("Extracting source model...");
        let model = self.pipeline.extract()?;
        info!("Extracted {} source elements", model.len());

        info!("Transforming...");
        let output = self.pipeline.transform(model)?;
        info!(
            "Transformed into {} target nodes ({} warnings, {} severe, {} audit findings)",
            output.target.len(),
            output.report.warnings,
            output.report.severe,
            output.findings.len()
        );

        info!("Loading...");
        let output_path = self.pipeline.load(output)?;
        info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
