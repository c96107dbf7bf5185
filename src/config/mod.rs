pub mod cli;
pub mod toml_config;

use crate::core::{ConfigProvider, EntrySource};
use crate::domain::model::{ForecastMode, DEFAULT_UNIT_PRICE};
use crate::utils::error::Result;
use crate::utils::validation::{
    self, validate_file_extension, validate_months, validate_path, validate_range, validate_url,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "mrr-forecast")]
#[command(about = "Project MRR, CAC and LTV across marketing channels")]
pub struct CliConfig {
    /// CSV or JSON file with one channel entry per record
    #[arg(long, default_value = "./channels.csv")]
    pub entries_file: String,

    /// Fetch channel entries from an HTTP endpoint instead of a file
    #[arg(long)]
    pub api_endpoint: Option<String>,

    /// Forecast horizon in months
    #[arg(long, default_value = "12")]
    pub months: u32,

    /// Monthly visitor growth rate in percent (negative = decay)
    #[arg(long, default_value = "10.0")]
    pub growth_rate: f64,

    /// Monthly subscription price per paid customer
    #[arg(long, default_value = "99.0")]
    pub unit_price: f64,

    /// Forecast model: churn-aware or share-apportioned
    #[arg(long, default_value = "churn-aware")]
    pub mode: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn entries_source(&self) -> EntrySource {
        match &self.api_endpoint {
            Some(endpoint) => EntrySource::Api(endpoint.clone()),
            None => EntrySource::File(self.entries_file.clone()),
        }
    }

    fn months(&self) -> u32 {
        self.months
    }

    fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    fn unit_price(&self) -> f64 {
        self.unit_price
    }

    fn mode(&self) -> ForecastMode {
        self.mode.parse().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

#[cfg(feature = "cli")]
impl validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match &self.api_endpoint {
            Some(endpoint) => validate_url("api_endpoint", endpoint)?,
            None => {
                validate_path("entries_file", &self.entries_file)?;
                validate_file_extension("entries_file", &self.entries_file, &["csv", "json"])?;
            }
        }

        validate_months("months", self.months)?;
        validate_range("growth_rate", self.growth_rate, -100.0, 100.0)?;
        validate_range("unit_price", self.unit_price, 0.01, 100_000.0)?;
        validate_path("output_path", &self.output_path)?;

        self.mode.parse::<ForecastMode>().map_err(|reason| {
            crate::utils::error::ForecastError::InvalidConfigValueError {
                field: "mode".to_string(),
                value: self.mode.clone(),
                reason,
            }
        })?;

        Ok(())
    }
}

#[cfg(feature = "cli")]
impl Default for CliConfig {
    fn default() -> Self {
        Self {
            entries_file: "./channels.csv".to_string(),
            api_endpoint: None,
            months: 12,
            growth_rate: 10.0,
            unit_price: DEFAULT_UNIT_PRICE,
            mode: ForecastMode::default().to_string(),
            output_path: "./output".to_string(),
            verbose: false,
            monitor: false,
        }
    }
}
