use anyhow::Result;
use mrr_forecast::config::toml_config::TomlConfig;
use mrr_forecast::utils::validation::Validate;
use mrr_forecast::{ForecastPipeline, ForecastRunner, LocalStorage};
use tempfile::TempDir;

fn plan_with_output(output_path: &str, extra_forecast_keys: &str) -> String {
    format!(
        r#"
[plan]
name = "integration-plan"
description = "Two channel growth plan"
version = "1.0.0"

[forecast]
months = 2
growth_rate = 10.0
{extra_forecast_keys}

[[channels]]
channel = "Search Engine Marketing"
medium = "Google Ads"
site_visitors = 1000.0
conversion_to_trial = 2.0
conversion_to_paid = 20.0
churn_rate = 2.0
cost = 500.0

[[channels]]
channel = "Community Building"
medium = "Forum"
site_visitors = 300.0
conversion_to_trial = 4.0
conversion_to_paid = 25.0
churn_rate = 3.0
cost = 150.0

[load]
output_path = "{output_path}"
"#
    )
}

fn read_archive_entry(archive_path: &std::path::Path, name: &str) -> Result<String> {
    let zip_data = std::fs::read(archive_path)?;
    let cursor = std::io::Cursor::new(zip_data);
    let mut archive = zip::ZipArchive::new(cursor)?;
    let mut file = archive.by_name(name)?;
    let mut content = String::new();
    std::io::Read::read_to_string(&mut file, &mut content)?;
    Ok(content)
}

#[tokio::test]
async fn test_toml_plan_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base_path = temp_dir.path().to_str().unwrap().to_string();

    let plan = plan_with_output("out", "");
    let config = TomlConfig::from_toml_str(&plan)?;
    config.validate()?;

    let storage = LocalStorage::new(base_path);
    let pipeline = ForecastPipeline::new(storage, config);
    let runner = ForecastRunner::new(pipeline);

    let output_path = runner.run().await?;
    assert_eq!(output_path, "out/forecast_output.zip");

    let archive_path = temp_dir.path().join("out/forecast_output.zip");
    let rows_content = read_archive_entry(&archive_path, "rows.json")?;
    let rows: Vec<serde_json::Value> = serde_json::from_str(&rows_content)?;

    // 2 channels x 2 months, entry-major ordering
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["Channel"], "Search Engine Marketing");
    assert_eq!(rows[0]["MRR"], 388.08);
    assert_eq!(rows[1]["Month"], 2);
    assert_eq!(rows[1]["Site Visitors"], 1100.0);
    assert_eq!(rows[2]["Channel"], "Community Building");
    assert_eq!(rows[2]["Month"], 1);

    let summary_content = read_archive_entry(&archive_path, "summary.json")?;
    let summary: serde_json::Value = serde_json::from_str(&summary_content)?;
    assert_eq!(summary["params"]["mode"], "churn-aware");
    assert_eq!(summary["params"]["unit_price"], 99.0);

    Ok(())
}

#[tokio::test]
async fn test_toml_plan_share_apportioned_mode() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base_path = temp_dir.path().to_str().unwrap().to_string();

    let plan = plan_with_output("out", "mode = \"share-apportioned\"");
    let config = TomlConfig::from_toml_str(&plan)?;
    config.validate()?;

    let storage = LocalStorage::new(base_path);
    let pipeline = ForecastPipeline::new(storage, config);
    let runner = ForecastRunner::new(pipeline);

    runner.run().await?;

    let archive_path = temp_dir.path().join("out/forecast_output.zip");
    let rows_content = read_archive_entry(&archive_path, "rows.json")?;
    let rows: Vec<serde_json::Value> = serde_json::from_str(&rows_content)?;

    // Month-major ordering in this mode
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["Month"], 1);
    assert_eq!(rows[1]["Month"], 1);
    assert_eq!(rows[2]["Month"], 2);
    assert_eq!(rows[3]["Month"], 2);

    // The draft model reports no LTV/ROI signal
    assert_eq!(rows[0]["LTV"], 0.0);
    assert_eq!(rows[0]["ROI"], 0.0);

    let summary_content = read_archive_entry(&archive_path, "summary.json")?;
    let summary: serde_json::Value = serde_json::from_str(&summary_content)?;
    assert_eq!(summary["params"]["mode"], "share-apportioned");

    Ok(())
}

#[tokio::test]
async fn test_plan_without_channels_is_gated_before_running() {
    let plan = r#"
[plan]
name = "empty-plan"
description = "Nothing to forecast"
version = "1.0.0"

[forecast]
months = 12
growth_rate = 10.0

[load]
output_path = "out"
"#;

    let config = TomlConfig::from_toml_str(plan).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err
        .to_string()
        .contains("Please add at least one channel entry"));
}

#[tokio::test]
async fn test_toml_plan_unit_price_override() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base_path = temp_dir.path().to_str().unwrap().to_string();

    let plan = plan_with_output("out", "unit_price = 49.0");
    let config = TomlConfig::from_toml_str(&plan)?;
    config.validate()?;

    let storage = LocalStorage::new(base_path);
    let pipeline = ForecastPipeline::new(storage, config);
    let runner = ForecastRunner::new(pipeline);

    runner.run().await?;

    let archive_path = temp_dir.path().join("out/forecast_output.zip");
    let rows_content = read_archive_entry(&archive_path, "rows.json")?;
    let rows: Vec<serde_json::Value> = serde_json::from_str(&rows_content)?;

    // 1000 x 2% x 20% x $49 x (1 - 2%)
    assert_eq!(rows[0]["MRR"], 192.08);

    Ok(())
}
