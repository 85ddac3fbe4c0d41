pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
mod args {
    use crate::config::toml_config::Conventions;
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "sysml2autosar")]
    #[command(about = "Transform a SysML architecture model into AUTOSAR software components")]
    pub struct CliConfig {
        #[arg(long, short, help = "Source model (JSON)")]
        pub input: String,

        #[arg(long, short, default_value = "./output")]
        pub output: String,

        #[arg(long, help = "Conventions file (TOML)")]
        pub config: Option<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log as JSON lines")]
        pub json_logs: bool,

        #[arg(long, help = "Fail when any severe diagnostic is reported")]
        pub strict: bool,

        #[arg(skip)]
        pub conventions: Conventions,
    }

    impl CliConfig {
        /// Replace the default conventions with the `--config` file, if given.
        pub fn load_conventions(&mut self) -> Result<()> {
            if let Some(path) = &self.config {
                self.conventions = Conventions::from_file(path)?;
            }
            Ok(())
        }
    }

    impl ConfigProvider for CliConfig {
        fn input_path(&self) -> &str {
            &self.input
        }

        fn output_path(&self) -> &str {
            &self.output
        }

        fn conventions(&self) -> &Conventions {
            &self.conventions
        }

        fn strict(&self) -> bool {
            self.strict
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_path("input", &self.input)?;
            validation::validate_path("output", &self.output)?;
            if let Some(config) = &self.config {
                validation::validate_path("config", config)?;
            }
            self.conventions.validate()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::io::Write;
        use tempfile::NamedTempFile;

        #[test]
        fn test_parse_and_load_conventions() {
            let mut file = NamedTempFile::new().unwrap();
            file.write_all(b"[naming]\ncalibration_suffix = \"_Cal\"\n").unwrap();
            let path = file.path().to_string_lossy().into_owned();

            let mut config =
                CliConfig::try_parse_from(["sysml2autosar", "--input", "model.json", "--config", path.as_str(), "--strict"])
                    .unwrap();
            assert_eq!(config.output, "./output");
            assert!(config.strict);

            config.load_conventions().unwrap();
            assert_eq!(config.conventions.naming.calibration_suffix, "_Cal");
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_empty_input_is_rejected() {
            let config = CliConfig::try_parse_from(["sysml2autosar", "--input", ""]).unwrap();
            assert!(config.validate().is_err());
        }
    }
}

#[cfg(feature = "cli")]
pub use args::CliConfig;
