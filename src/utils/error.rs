use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed input table {table}: {message}")]
    MalformedInput { table: String, message: String },

    #[error("Corrupt summary table for cohort {cohort}, classification {classification}: {reason}")]
    CorruptSummary {
        cohort: String,
        classification: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Informational; the run still produced usable output.
    Low,
    /// Bad configuration; fixable without touching the data.
    Medium,
    /// Bad input data; the run stopped to avoid corrupt output.
    High,
    /// Environment failure (disk, permissions).
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    InputData,
    Storage,
    Internal,
}

impl PipelineError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PipelineError::Io(_) => ErrorSeverity::Critical,
            PipelineError::Csv(_)
            | PipelineError::MalformedInput { .. }
            | PipelineError::CorruptSummary { .. }
            | PipelineError::Serialization(_) => ErrorSeverity::High,
            PipelineError::MissingConfig { .. } | PipelineError::InvalidConfigValue { .. } => {
                ErrorSeverity::Medium
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::Io(_) => ErrorCategory::Storage,
            PipelineError::Csv(_)
            | PipelineError::MalformedInput { .. }
            | PipelineError::CorruptSummary { .. } => ErrorCategory::InputData,
            PipelineError::MissingConfig { .. } | PipelineError::InvalidConfigValue { .. } => {
                ErrorCategory::Configuration
            }
            PipelineError::Serialization(_) => ErrorCategory::Internal,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PipelineError::Io(_) => {
                "Check that the input and output paths exist and are writable".to_string()
            }
            PipelineError::Csv(_) => {
                "Check that the input tables are well-formed delimited text".to_string()
            }
            PipelineError::MalformedInput { table, .. } => format!(
                "Re-export {} from the upstream tool; it is missing required fields",
                table
            ),
            PipelineError::CorruptSummary {
                cohort,
                classification,
                ..
            } => format!(
                "Re-run the count stage for cohort {} to regenerate the {} summary",
                cohort, classification
            ),
            PipelineError::MissingConfig { field } => format!(
                "Provide a value for {} on the command line or in the config file",
                field
            ),
            PipelineError::InvalidConfigValue { field, .. } => {
                format!("Correct the value of {}", field)
            }
            PipelineError::Serialization(_) => "Report this as a bug".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PipelineError::Io(e) => format!("File access failed: {}", e),
            PipelineError::Csv(e) => format!("Could not parse a table: {}", e),
            PipelineError::MalformedInput { table, message } => {
                format!("Input table {} is malformed: {}", table, message)
            }
            PipelineError::CorruptSummary {
                cohort,
                classification,
                reason,
            } => format!(
                "Summary for cohort {} / {} could not be read: {}",
                cohort, classification, reason
            ),
            PipelineError::MissingConfig { field } => format!("Missing setting: {}", field),
            PipelineError::InvalidConfigValue {
                field,
                value,
                reason,
            } => format!("Bad setting {}={}: {}", field, value, reason),
            PipelineError::Serialization(e) => format!("Internal serialization failure: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_is_high_severity() {
        let err = PipelineError::MalformedInput {
            table: "CVD46.csv".to_string(),
            message: "missing column Gene".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.category(), ErrorCategory::InputData);
        assert!(err.recovery_suggestion().contains("CVD46.csv"));
    }

    #[test]
    fn test_config_errors_are_medium_severity() {
        let err = PipelineError::InvalidConfigValue {
            field: "cohorts".to_string(),
            value: "".to_string(),
            reason: "empty".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PipelineError = io.into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
