use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ForecastError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ForecastError::ApiError(_) => ErrorCategory::Network,
            ForecastError::CsvError(_)
            | ForecastError::SerializationError(_)
            | ForecastError::ProcessingError { .. } => ErrorCategory::Data,
            ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ForecastError::IoError(_) | ForecastError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路來源可重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ForecastError::ApiError(_) => {
                "Check the entries endpoint URL and network connectivity, then retry"
            }
            ForecastError::CsvError(_) => {
                "Check that the entries file has the expected columns: channel, medium, site_visitors, conversion_to_trial, conversion_to_paid, churn_rate, cost"
            }
            ForecastError::SerializationError(_) => {
                "Check that the JSON input is an array of channel entry objects"
            }
            ForecastError::ZipError(_) | ForecastError::IoError(_) => {
                "Check that the output directory exists and is writable"
            }
            ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::MissingConfigError { .. } => {
                "Fix the configuration value and run again; see --help for accepted ranges"
            }
            ForecastError::ProcessingError { .. } => {
                "Inspect the log output with --verbose for the failing stage"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ForecastError::ApiError(_) => "Could not reach the channel entries endpoint".to_string(),
            ForecastError::CsvError(_) => "The channel entries file could not be parsed".to_string(),
            ForecastError::SerializationError(_) => "The JSON input could not be parsed".to_string(),
            ForecastError::IoError(_) => "A file could not be read or written".to_string(),
            ForecastError::ZipError(_) => "The report archive could not be created".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_map_to_high_severity() {
        let err = ForecastError::InvalidConfigValueError {
            field: "months".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        };

        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_system_errors_are_critical() {
        let err = ForecastError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));

        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
