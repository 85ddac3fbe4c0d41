use crate::utils::error::{Result, TransformError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Naming, stereotype and default-value conventions applied by the rules.
///
/// Every field has a default, so a TOML file only needs the overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    pub naming: NamingConfig,
    pub runnable: RunnableConfig,
    pub stereotypes: StereotypeConfig,
    pub tags: TagConfig,
    pub data_types: DataTypeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub internal_behavior_prefix: String,
    pub per_instance_memory_suffix: String,
    pub calibration_suffix: String,
    pub calibration_init_label: String,
    pub timing_event_prefix: String,
    pub data_received_prefix: String,
    pub data_send_prefix: String,
    pub server_call_prefix: String,
    pub component_prototype_prefix: String,
    pub composition_suffix: String,
    pub data_holder_prefix: String,
    pub base_type_prefix: String,
    pub enum_unit: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            internal_behavior_prefix: "IB_".to_string(),
            per_instance_memory_suffix: "_NV".to_string(),
            calibration_suffix: "_C".to_string(),
            calibration_init_label: "Init_0".to_string(),
            timing_event_prefix: "TE_".to_string(),
            data_received_prefix: "DR_".to_string(),
            data_send_prefix: "DS_".to_string(),
            server_call_prefix: "OI_OA_".to_string(),
            component_prototype_prefix: "CtSt_".to_string(),
            composition_suffix: "_Cmpstn".to_string(),
            data_holder_prefix: "SRI_".to_string(),
            base_type_prefix: "sbt_".to_string(),
            enum_unit: "EnumUnit".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnableConfig {
    pub minimum_start_interval: i64,
    pub can_be_invoked_concurrently: bool,
    pub server_call_timeout: f64,
}

impl Default for RunnableConfig {
    fn default() -> Self {
        Self {
            minimum_start_interval: 100,
            can_be_invoked_concurrently: false,
            server_call_timeout: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereotypeConfig {
    pub operation_with_data: String,
    pub operation_with_event: String,
    pub per_instance_memory: String,
    pub calibration: String,
    pub flow_property: String,
    pub timing_event: String,
}

impl Default for StereotypeConfig {
    fn default() -> Self {
        Self {
            operation_with_data: "operationWdata".to_string(),
            operation_with_event: "operationWevent".to_string(),
            per_instance_memory: "PIMProperty".to_string(),
            calibration: "calibration".to_string(),
            flow_property: "flowProperty".to_string(),
            timing_event: "timingEvent".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    pub event: String,
    pub period: String,
    pub data_received: String,
    pub event_type: String,
    pub unit: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            event: "event".to_string(),
            period: "period".to_string(),
            data_received: "dataReceived".to_string(),
            event_type: "type".to_string(),
            unit: "unit".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTypeConfig {
    /// Category written on every implementation data type.
    pub category: String,
}

impl Default for DataTypeConfig {
    fn default() -> Self {
        Self {
            category: "STRING".to_string(),
        }
    }
}

impl Conventions {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TransformError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TransformError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables stay verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TransformError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let n = &self.naming;
        for (field, value) in [
            ("naming.internal_behavior_prefix", &n.internal_behavior_prefix),
            ("naming.per_instance_memory_suffix", &n.per_instance_memory_suffix),
            ("naming.calibration_suffix", &n.calibration_suffix),
            ("naming.timing_event_prefix", &n.timing_event_prefix),
            ("naming.data_received_prefix", &n.data_received_prefix),
            ("naming.data_send_prefix", &n.data_send_prefix),
            ("naming.server_call_prefix", &n.server_call_prefix),
            ("naming.component_prototype_prefix", &n.component_prototype_prefix),
            ("naming.composition_suffix", &n.composition_suffix),
            ("naming.data_holder_prefix", &n.data_holder_prefix),
            ("naming.base_type_prefix", &n.base_type_prefix),
        ] {
            validation::validate_name_affix(field, value)?;
        }
        validation::validate_short_name("naming.enum_unit", &n.enum_unit)?;
        validation::validate_short_name("naming.calibration_init_label", &n.calibration_init_label)?;
        validation::validate_short_name("data_types.category", &self.data_types.category)?;

        let s = &self.stereotypes;
        for (field, value) in [
            ("stereotypes.operation_with_data", &s.operation_with_data),
            ("stereotypes.operation_with_event", &s.operation_with_event),
            ("stereotypes.per_instance_memory", &s.per_instance_memory),
            ("stereotypes.calibration", &s.calibration),
            ("stereotypes.flow_property", &s.flow_property),
            ("stereotypes.timing_event", &s.timing_event),
        ] {
            validation::validate_non_empty_string(field, value)?;
        }

        validation::validate_range(
            "runnable.minimum_start_interval",
            self.runnable.minimum_start_interval,
            0,
            i64::from(u32::MAX),
        )?;
        validation::validate_range("runnable.server_call_timeout", self.runnable.server_call_timeout, 0.0, 3600.0)?;
        Ok(())
    }
}

impl Validate for Conventions {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
