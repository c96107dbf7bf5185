use crate::domain::model::{ChannelEntry, MAX_FORECAST_MONTHS};
use crate::utils::error::{ForecastError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ForecastError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    if let Some(extension) = std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        if !allowed_set.contains(extension) {
            return Err(ForecastError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.to_string(),
                reason: format!(
                    "Unsupported file extension: {}. Allowed extensions: {}",
                    extension,
                    allowed_extensions.join(", ")
                ),
            });
        }
    } else {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ForecastError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
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
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_non_negative(field_name: &str, value: f64) -> Result<()> {
    if value < 0.0 || !value.is_finite() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a non-negative number".to_string(),
        });
    }
    Ok(())
}

/// 預測月數必須落在 1..=MAX_FORECAST_MONTHS
pub fn validate_months(field_name: &str, months: u32) -> Result<()> {
    validate_range(field_name, months, 1, MAX_FORECAST_MONTHS)
}

impl Validate for ChannelEntry {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("medium", &self.medium)?;
        validate_non_negative("site_visitors", self.site_visitors)?;
        validate_range("conversion_to_trial", self.conversion_to_trial, 0.0, 100.0)?;
        validate_range("conversion_to_paid", self.conversion_to_paid, 0.0, 100.0)?;
        validate_range("churn_rate", self.churn_rate, 0.0, 100.0)?;
        validate_non_negative("cost", self.cost)?;
        Ok(())
    }
}
