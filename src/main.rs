use clap::Parser;
use mrr_forecast::utils::{logger, validation::Validate};
use mrr_forecast::{CliConfig, ForecastPipeline, ForecastRunner, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting mrr-forecast CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 建立存儲與管道
    let storage = LocalStorage::new(".".to_string());
    let pipeline = ForecastPipeline::new(storage, config);

    // 建立 Runner 並執行
    let runner = ForecastRunner::new_with_monitoring(pipeline, monitor_enabled);

    match runner.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Forecast completed successfully!");
            tracing::info!("📁 Report saved to: {}", output_path);
            println!("✅ Forecast completed successfully!");
            println!("📁 Report saved to: {}", output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Forecast failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                mrr_forecast::utils::error::ErrorSeverity::Low => 0,
                mrr_forecast::utils::error::ErrorSeverity::Medium => 2,
                mrr_forecast::utils::error::ErrorSeverity::High => 1,
                mrr_forecast::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
