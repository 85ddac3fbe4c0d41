pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::toml_config::Conventions;

pub use crate::core::{engine::TransformEngine, pipeline::ModelPipeline, Transformer};
pub use crate::domain::source::SourceModel;
pub use crate::domain::target::TargetModel;
pub use crate::utils::error::{Result, TransformError};
