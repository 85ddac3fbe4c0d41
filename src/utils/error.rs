use crate::core::diagnostics::Severity;
use crate::domain::source::SourceId;
use crate::domain::target::TargetId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Source model error: {message}")]
    ModelError { message: String },

    #[error("Unknown source element {0}")]
    UnknownSourceElement(SourceId),

    #[error("Unknown target node {0}")]
    UnknownTargetNode(TargetId),

    #[error("Source element {source_element} is already mapped to {existing}, refusing {new}")]
    MappingAlreadyExists {
        source_element: SourceId,
        existing: TargetId,
        new: TargetId,
    },

    #[error("Target node {target} already belongs to {existing}, refusing {new}")]
    TargetAlreadyMapped {
        target: TargetId,
        existing: SourceId,
        new: SourceId,
    },

    #[error("No target {expected} found for '{element}'")]
    MissingCorrespondence { expected: String, element: String },

    #[error("'{element}' cannot be classified: {reason}")]
    Unclassifiable { element: String, reason: String },

    #[error("{what} not found for '{element}'")]
    NotFound { what: String, element: String },
}

impl TransformError {
    /// Severity this error is reported with when a rule aborts on it.
    pub fn severity(&self) -> Severity {
        match self {
            TransformError::Unclassifiable { .. } => Severity::Warning,
            _ => Severity::Severe,
        }
    }

    /// Process exit code for errors that escape the pipeline.
    pub fn exit_code(&self) -> i32 {
        match self {
            TransformError::ConfigValidationError { .. }
            | TransformError::InvalidConfigValueError { .. } => 2,
            TransformError::IoError(_) | TransformError::SerializationError(_) => 3,
            TransformError::ModelError { .. } => 4,
            _ => 1,
        }
    }

    pub fn missing(expected: &str, element: impl Into<String>) -> Self {
        TransformError::MissingCorrespondence {
            expected: expected.to_string(),
            element: element.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
