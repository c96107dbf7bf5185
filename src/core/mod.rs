pub mod engine;
pub mod pipeline;
pub mod runner;
pub mod worksheet;

pub use crate::domain::model::{
    Channel, ChannelEntry, Forecast, ForecastMode, ForecastOutput, ForecastParams, ForecastRow,
    ForecastSummary,
};
pub use crate::domain::ports::{ConfigProvider, EntrySource, Pipeline, Storage};
pub use crate::utils::error::Result;
