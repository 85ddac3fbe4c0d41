use anyhow::Context;
use clap::Parser;
use sysml2autosar::utils::{logger, validation::Validate};
use sysml2autosar::{CliConfig, LocalStorage, ModelPipeline, TransformEngine, TransformError};

fn run(config: CliConfig) -> anyhow::Result<String> {
    let input = config.input.clone();
    let storage = LocalStorage::new(".".to_string());
    let pipeline = ModelPipeline::new(storage, config);
    let engine = TransformEngine::new(pipeline);
    engine
        .run()
        .with_context(|| format!("failed to transform '{}'", input))
}

fn main() {
    let mut config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting sysml2autosar CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.load_conventions().and_then(|()| config.validate()) {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }

    match run(config) {
        Ok(output_path) => {
            tracing::info!("Transformation completed");
            println!("Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("{:#}", e);
            let exit_code = e
                .downcast_ref::<TransformError>()
                .map(TransformError::exit_code)
                .unwrap_or(1);
            std::process::exit(exit_code);
        }
    }
}
