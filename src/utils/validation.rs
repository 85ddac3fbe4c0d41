use crate::utils::error::{Result, TransformError};
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_SHORT_NAME_LEN: usize = 128;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn short_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("short name pattern is valid"))
}

fn affix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("affix pattern is valid"))
}

pub fn is_valid_short_name(name: &str) -> bool {
    name.len() <= MAX_SHORT_NAME_LEN && short_name_pattern().is_match(name)
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TransformError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TransformError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TransformError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// A complete AUTOSAR short name: letter first, then letters, digits or `_`.
pub fn validate_short_name(field_name: &str, value: &str) -> Result<()> {
    if !is_valid_short_name(value) {
        return Err(TransformError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!(
                "Must match [A-Za-z][A-Za-z0-9_]* and be at most {} characters",
                MAX_SHORT_NAME_LEN
            ),
        });
    }
    Ok(())
}

/// A prefix or suffix glued onto short names; may start with `_` or a digit.
pub fn validate_name_affix(field_name: &str, value: &str) -> Result<()> {
    if !affix_pattern().is_match(value) {
        return Err(TransformError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Affix must be non-empty and contain only letters, digits or '_'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TransformError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_short_name() {
        assert!(validate_short_name("name", "IB_Controller").is_ok());
        assert!(validate_short_name("name", "a1").is_ok());
        assert!(validate_short_name("name", "").is_err());
        assert!(validate_short_name("name", "_leading").is_err());
        assert!(validate_short_name("name", "1st").is_err());
        assert!(validate_short_name("name", "has space").is_err());
        assert!(validate_short_name("name", &"a".repeat(129)).is_err());
        assert!(validate_short_name("name", &"a".repeat(128)).is_ok());
    }

    #[test]
    fn test_validate_name_affix() {
        assert!(validate_name_affix("prefix", "OI_OA_").is_ok());
        assert!(validate_name_affix("suffix", "_NV").is_ok());
        assert!(validate_name_affix("prefix", "").is_err());
        assert!(validate_name_affix("prefix", "TE-").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("input", "model.json").is_ok());
        assert!(validate_path("input", "").is_err());
        assert!(validate_path("input", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("stereotype", "calibration").is_ok());
        assert!(validate_non_empty_string("stereotype", "").is_err());
        assert!(validate_non_empty_string("stereotype", "   ").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("timeout", 1.0, 0.0, 10.0).is_ok());
        assert!(validate_range("timeout", -1.0, 0.0, 10.0).is_err());
        assert!(validate_range("interval", 100, 0, 1000).is_ok());
        assert!(validate_range("interval", 1001, 0, 1000).is_err());
    }
}
