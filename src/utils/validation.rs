use crate::utils::error::{PipelineError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PipelineError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PipelineError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PipelineError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_unique_ids(field_name: &str, ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        return Err(PipelineError::MissingConfig {
            field: field_name.to_string(),
        });
    }

    let mut seen = HashSet::new();
    for id in ids {
        validate_non_empty_string(field_name, id)?;
        if !seen.insert(id.as_str()) {
            return Err(PipelineError::InvalidConfigValue {
                field: field_name.to_string(),
                value: id.clone(),
                reason: "Duplicate identifier".to_string(),
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
        assert!(validate_path("input_root", "cohorts/raw").is_ok());
        assert!(validate_path("input_root", "").is_err());
        assert!(validate_path("input_root", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_unique_ids() {
        let cohorts = vec!["Cohort_1".to_string(), "Cohort_2".to_string()];
        assert!(validate_unique_ids("cohorts", &cohorts).is_ok());

        let duplicated = vec!["Cohort_1".to_string(), "Cohort_1".to_string()];
        assert!(validate_unique_ids("cohorts", &duplicated).is_err());

        assert!(validate_unique_ids("cohorts", &[]).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("cohorts", "Cohort_1").is_ok());
        assert!(validate_non_empty_string("cohorts", "   ").is_err());
    }
}
