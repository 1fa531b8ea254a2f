use crate::utils::error::{AssessmentError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Output formats the load phase knows how to write.
pub const SUPPORTED_FORMATS: [&str; 5] = ["png", "svg", "csv", "json", "zip"];

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(AssessmentError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AssessmentError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(AssessmentError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
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
    // NaN 也會在這裡被擋下
    if !(value >= min && value <= max) {
        return Err(AssessmentError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AssessmentError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| AssessmentError::MissingConfig {
        field: field_name.to_string(),
    })
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => Ok(()),
        Some(extension) => Err(AssessmentError::InvalidConfigValue {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(AssessmentError::InvalidConfigValue {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(AssessmentError::MissingConfig {
            field: field_name.to_string(),
        });
    }

    for format in formats {
        if !SUPPORTED_FORMATS.contains(&format.as_str()) {
            return Err(AssessmentError::InvalidConfigValue {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    SUPPORTED_FORMATS.join(", ")
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_path", "./output").is_ok());
        assert!(validate_path("output_path", "  ").is_err());
        assert!(validate_path("output_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("answers.csv".to_string());
        assert_eq!(validate_required_field("input", &present).unwrap(), "answers.csv");

        let absent: Option<String> = None;
        let err = validate_required_field("input", &absent).unwrap_err();
        assert!(matches!(err, AssessmentError::MissingConfig { ref field } if field == "input"));
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("gap_ratio", 0.5, 0.0, 4.0).is_ok());
        assert!(validate_range("gap_ratio", f64::NAN, 0.0, 4.0).is_err());
        assert!(validate_range("gap_ratio", 5.0, 0.0, 4.0).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("input", "answers.csv", &["csv", "txt"]).is_ok());
        assert!(validate_file_extension("input", "answers.CSV", &["csv", "txt"]).is_ok());
        assert!(validate_file_extension("input", "answers.xlsx", &["csv", "txt"]).is_err());
        assert!(validate_file_extension("input", "answers", &["csv", "txt"]).is_err());
    }

    #[test]
    fn test_validate_formats() {
        let ok = vec!["png".to_string(), "zip".to_string()];
        assert!(validate_formats("formats", &ok).is_ok());

        let bad = vec!["pdf".to_string()];
        assert!(validate_formats("formats", &bad).is_err());
        assert!(validate_formats("formats", &[]).is_err());
    }
}
