use crate::core::engine::run_forecast;
use crate::core::worksheet::Worksheet;
use crate::domain::model::{
    ChannelEntry, ForecastOutput, ForecastParams, ForecastRow, ForecastSummary,
};
use crate::domain::ports::{ConfigProvider, EntrySource, Pipeline, Storage};
use crate::utils::error::{ForecastError, Result};
use reqwest::Client;
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const OUTPUT_ARCHIVE: &str = "forecast_output.zip";

/// Extract channel entries, project them, and package the report.
pub struct ForecastPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> ForecastPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    fn parse_csv_entries(&self, data: &[u8]) -> Result<Vec<ChannelEntry>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data);

        let mut entries = Vec::new();
        for record in reader.deserialize::<ChannelEntry>() {
            entries.push(record?);
        }
        Ok(entries)
    }

    async fn fetch_api_entries(&self, endpoint: &str) -> Result<Vec<ChannelEntry>> {
        // 從遠端指標服務取得通道資料
        tracing::debug!("Requesting channel entries from: {}", endpoint);
        let response = self.client.get(endpoint).send().await?;

        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            tracing::warn!(
                "API returned {}, continuing with an empty worksheet",
                response.status()
            );
            return Ok(Vec::new());
        }

        let entries: Vec<ChannelEntry> = response.json().await?;
        Ok(entries)
    }

    fn render_table(&self, rows: &[ForecastRow], delimiter: u8) -> Result<String> {
        if rows.is_empty() {
            return Ok(String::new());
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }

        let bytes = writer.into_inner().map_err(|e| ForecastError::ProcessingError {
            message: format!("failed to flush table writer: {}", e),
        })?;
        String::from_utf8(bytes).map_err(|e| ForecastError::ProcessingError {
            message: format!("table output is not valid UTF-8: {}", e),
        })
    }
}

/// 摘要報告的 JSON 封裝，附帶產生時間與使用的參數
#[derive(Debug, Serialize)]
struct SummaryArtifact {
    generated_at: chrono::DateTime<chrono::Utc>,
    params: ForecastParams,
    #[serde(flatten)]
    summary: ForecastSummary,
    total_arr: f64,
    blended_cac: f64,
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ForecastPipeline<S, C> {
    async fn extract(&self) -> Result<Worksheet> {
        let entries = match self.config.entries_source() {
            EntrySource::Inline(entries) => entries,
            EntrySource::File(path) => {
                tracing::debug!("Reading channel entries from: {}", path);
                let data = self.storage.read_file(&path).await?;
                if path.ends_with(".json") {
                    serde_json::from_slice(&data)?
                } else {
                    // 副檔名已由配置層驗證，其餘一律視為 CSV
                    self.parse_csv_entries(&data)?
                }
            }
            EntrySource::Api(endpoint) => self.fetch_api_entries(&endpoint).await?,
        };

        let mut worksheet = Worksheet::new();
        for entry in entries {
            worksheet.add(entry);
        }

        if worksheet.is_empty() {
            tracing::warn!("No channel entries found - add at least one set of metrics");
        }

        Ok(worksheet)
    }

    async fn transform(&self, worksheet: Worksheet) -> Result<ForecastOutput> {
        let params = ForecastParams {
            months: self.config.months(),
            growth_rate: self.config.growth_rate(),
            unit_price: self.config.unit_price(),
            mode: self.config.mode(),
        };

        tracing::debug!(
            "Projecting {} entries over {} months ({} mode)",
            worksheet.len(),
            params.months,
            params.mode
        );
        let forecast = run_forecast(worksheet.entries(), &params);

        let csv_output = self.render_table(&forecast.rows, b',')?;
        let tsv_output = self.render_table(&forecast.rows, b'\t')?;

        Ok(ForecastOutput {
            rows: forecast.rows,
            summary: forecast.summary,
            csv_output,
            tsv_output,
        })
    }

    async fn load(&self, output: ForecastOutput) -> Result<String> {
        let output_path = format!("{}/{}", self.config.output_path(), OUTPUT_ARCHIVE);

        let summary = SummaryArtifact {
            generated_at: chrono::Utc::now(),
            params: ForecastParams {
                months: self.config.months(),
                growth_rate: self.config.growth_rate(),
                unit_price: self.config.unit_price(),
                mode: self.config.mode(),
            },
            summary: output.summary,
            total_arr: output.summary.total_arr(),
            blended_cac: output.summary.blended_cac(),
        };

        tracing::debug!(
            "Creating report archive with {} files",
            3 + if output.rows.is_empty() { 0 } else { 1 }
        );

        // 打包 CSV/TSV 報表與摘要
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("forecast.csv", FileOptions::default())?;
            zip.write_all(output.csv_output.as_bytes())?;

            zip.start_file::<_, ()>("forecast.tsv", FileOptions::default())?;
            zip.write_all(output.tsv_output.as_bytes())?;

            zip.start_file::<_, ()>("summary.json", FileOptions::default())?;
            let summary_json = serde_json::to_string_pretty(&summary)?;
            zip.write_all(summary_json.as_bytes())?;

            // 機器可讀的逐列結果
            if !output.rows.is_empty() {
                zip.start_file::<_, ()>("rows.json", FileOptions::default())?;
                let rows_json = serde_json::to_string_pretty(&output.rows)?;
                zip.write_all(rows_json.as_bytes())?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing report archive ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&output_path, &zip_data).await?;

        Ok(output_path)
    }
}
