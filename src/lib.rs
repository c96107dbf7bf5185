pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;

pub use core::{
    engine::run_forecast, pipeline::ForecastPipeline, runner::ForecastRunner, worksheet::Worksheet,
};
pub use domain::model::{
    Channel, ChannelEntry, Forecast, ForecastMode, ForecastParams, ForecastRow, ForecastSummary,
    DEFAULT_UNIT_PRICE,
};
pub use utils::error::{ForecastError, Result};
