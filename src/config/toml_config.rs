use crate::core::{ConfigProvider, EntrySource};
use crate::domain::model::{ChannelEntry, ForecastMode, DEFAULT_UNIT_PRICE};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_months, validate_path, validate_range,
    validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub plan: PlanConfig,
    pub forecast: ForecastConfig,
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub months: u32,
    pub growth_rate: f64,
    pub unit_price: Option<f64>,
    pub mode: Option<ForecastMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入預測計畫
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ForecastError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析預測計畫
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${METRICS_ENDPOINT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證計畫的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_months("forecast.months", self.forecast.months)?;
        validate_range("forecast.growth_rate", self.forecast.growth_rate, -100.0, 100.0)?;
        if let Some(unit_price) = self.forecast.unit_price {
            validate_range("forecast.unit_price", unit_price, 0.01, 100_000.0)?;
        }

        validate_path("load.output_path", &self.load.output_path)?;

        match &self.source {
            Some(source) => {
                if !self.channels.is_empty() {
                    return Err(ForecastError::InvalidConfigValueError {
                        field: "channels".to_string(),
                        value: format!("{} inline entries", self.channels.len()),
                        reason: "Declare channels inline or via [source], not both".to_string(),
                    });
                }
                match source.r#type.as_str() {
                    "file" => {
                        let path = validate_required_field("source.path", &source.path)?;
                        validate_path("source.path", path)?;
                        validate_file_extension("source.path", path, &["csv", "json"])?;
                    }
                    "api" => {
                        let endpoint =
                            validate_required_field("source.endpoint", &source.endpoint)?;
                        validate_url("source.endpoint", endpoint)?;
                    }
                    other => {
                        return Err(ForecastError::InvalidConfigValueError {
                            field: "source.type".to_string(),
                            value: other.to_string(),
                            reason: "Supported source types: file, api".to_string(),
                        });
                    }
                }
            }
            None => {
                // 未指定來源時必須內嵌至少一個通道
                if self.channels.is_empty() {
                    return Err(ForecastError::ConfigValidationError {
                        field: "channels".to_string(),
                        message: "Please add at least one channel entry before forecasting"
                            .to_string(),
                    });
                }
            }
        }

        for (index, entry) in self.channels.iter().enumerate() {
            entry.validate().map_err(|e| ForecastError::ConfigValidationError {
                field: format!("channels[{}]", index),
                message: e.to_string(),
            })?;
        }

        Ok(())
    }

    /// 是否啟用監控
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn entries_source(&self) -> EntrySource {
        match &self.source {
            Some(source) if source.r#type == "api" => {
                EntrySource::Api(source.endpoint.clone().unwrap_or_default())
            }
            Some(source) => EntrySource::File(source.path.clone().unwrap_or_default()),
            None => EntrySource::Inline(self.channels.clone()),
        }
    }

    fn months(&self) -> u32 {
        self.forecast.months
    }

    fn growth_rate(&self) -> f64 {
        self.forecast.growth_rate
    }

    fn unit_price(&self) -> f64 {
        self.forecast.unit_price.unwrap_or(DEFAULT_UNIT_PRICE)
    }

    fn mode(&self) -> ForecastMode {
        self.forecast.mode.unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Channel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_PLAN: &str = r#"
[plan]
name = "q3-growth"
description = "Q3 growth plan"
version = "1.0.0"

[forecast]
months = 12
growth_rate = 10.0

[[channels]]
channel = "Content Marketing"
medium = "Blog"
site_visitors = 1000.0
conversion_to_trial = 2.0
conversion_to_paid = 20.0
churn_rate = 2.0
cost = 500.0

[load]
output_path = "./output"
"#;

    #[test]
    fn test_parse_basic_plan() {
        let config = TomlConfig::from_toml_str(BASIC_PLAN).unwrap();

        assert_eq!(config.plan.name, "q3-growth");
        assert_eq!(config.forecast.months, 12);
        assert_eq!(config.channels.len(), 1);
        assert_eq!(config.channels[0].channel, Channel::ContentMarketing);
        assert_eq!(config.unit_price(), DEFAULT_UNIT_PRICE);
        assert_eq!(config.mode(), ForecastMode::ChurnAware);
        assert!(config.validate().is_ok());

        assert_eq!(
            config.entries_source(),
            EntrySource::Inline(config.channels.clone())
        );
    }

    #[test]
    fn test_parse_share_apportioned_mode_and_price() {
        let plan = BASIC_PLAN.replace(
            "growth_rate = 10.0",
            "growth_rate = 10.0\nunit_price = 49.0\nmode = \"share-apportioned\"",
        );
        let config = TomlConfig::from_toml_str(&plan).unwrap();

        assert_eq!(config.unit_price(), 49.0);
        assert_eq!(config.mode(), ForecastMode::ShareApportioned);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_METRICS_ENDPOINT", "https://metrics.test/channels");

        let plan = r#"
[plan]
name = "env-test"
description = "env"
version = "1.0"

[forecast]
months = 6
growth_rate = 5.0

[source]
type = "api"
endpoint = "${TEST_METRICS_ENDPOINT}"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(plan).unwrap();
        assert_eq!(
            config.source.as_ref().unwrap().endpoint.as_deref(),
            Some("https://metrics.test/channels")
        );
        assert!(config.validate().is_ok());

        std::env::remove_var("TEST_METRICS_ENDPOINT");
    }

    #[test]
    fn test_plan_without_channels_is_rejected() {
        let plan = r#"
[plan]
name = "empty"
description = "no channels"
version = "1.0"

[forecast]
months = 12
growth_rate = 10.0

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(plan).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least one channel entry"));
    }

    #[test]
    fn test_source_and_inline_channels_conflict() {
        let plan = BASIC_PLAN.replace(
            "[load]",
            "[source]\ntype = \"file\"\npath = \"channels.csv\"\n\n[load]",
        );

        let config = TomlConfig::from_toml_str(&plan).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_channel_entry_is_rejected() {
        let plan = BASIC_PLAN.replace("churn_rate = 2.0", "churn_rate = 120.0");
        let config = TomlConfig::from_toml_str(&plan).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_months_rejected() {
        let plan = BASIC_PLAN.replace("months = 12", "months = 0");
        let config = TomlConfig::from_toml_str(&plan).unwrap();
        assert!(config.validate().is_err());

        let plan = BASIC_PLAN.replace("months = 12", "months = 240");
        let config = TomlConfig::from_toml_str(&plan).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_source_type_rejected() {
        let plan = r#"
[plan]
name = "bad-source"
description = "bad"
version = "1.0"

[forecast]
months = 12
growth_rate = 10.0

[source]
type = "spreadsheet"
path = "channels.csv"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(plan).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_PLAN.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.plan.name, "q3-growth");
    }
}
