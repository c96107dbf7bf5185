use crate::core::worksheet::Worksheet;
use crate::domain::model::{ForecastMode, ForecastOutput};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where the pipeline finds its channel entries.
#[derive(Debug, Clone, PartialEq)]
pub enum EntrySource {
    /// CSV or JSON file, resolved through the Storage adapter.
    File(String),
    /// HTTP endpoint returning a JSON array of entries.
    Api(String),
    /// Entries declared inline in the plan configuration.
    Inline(Vec<crate::domain::model::ChannelEntry>),
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn entries_source(&self) -> EntrySource;
    fn months(&self) -> u32;
    fn growth_rate(&self) -> f64;
    fn unit_price(&self) -> f64;
    fn mode(&self) -> ForecastMode;
    fn output_path(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Worksheet>;
    async fn transform(&self, worksheet: Worksheet) -> Result<ForecastOutput>;
    async fn load(&self, output: ForecastOutput) -> Result<String>;
}
