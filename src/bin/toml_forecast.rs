use clap::Parser;
use mrr_forecast::config::toml_config::TomlConfig;
use mrr_forecast::core::{ConfigProvider, EntrySource};
use mrr_forecast::utils::{logger, validation::Validate};
use mrr_forecast::{ForecastPipeline, ForecastRunner, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-forecast")]
#[command(about = "Run a marketing forecast from a TOML plan file")]
struct Args {
    /// Path to TOML plan file
    #[arg(short, long, default_value = "forecast-plan.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from the plan
    #[arg(long)]
    monitor: Option<bool>,

    /// Override forecast mode from the plan (churn-aware or share-apportioned)
    #[arg(long)]
    mode: Option<String>,

    /// Dry run - show what would be projected without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based forecast tool");
    tracing::info!("📁 Loading plan from: {}", args.config);

    // 載入 TOML 計畫
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load plan file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(mode) = &args.mode {
        match mode.parse() {
            Ok(mode) => {
                config.forecast.mode = Some(mode);
                tracing::info!("🔧 Forecast mode overridden to: {}", mode);
            }
            Err(reason) => {
                eprintln!("❌ Invalid --mode value: {}", reason);
                std::process::exit(1);
            }
        }
    }

    // 驗證計畫
    if let Err(e) = config.validate() {
        tracing::error!("❌ Plan validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Plan loaded and validated successfully");

    // 顯示計畫摘要
    display_plan_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No forecast will be produced");
        perform_dry_run(&config);
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

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
            tracing::error!(
                "❌ Forecast failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

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

fn display_plan_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Plan Summary:");
    println!("  Plan: {} v{}", config.plan.name, config.plan.version);
    println!("  Horizon: {} months", config.months());
    println!("  Growth Rate: {}%/month", config.growth_rate());
    println!("  Unit Price: ${}", config.unit_price());
    println!("  Mode: {}", config.mode());

    match config.entries_source() {
        EntrySource::Inline(entries) => println!("  Channels: {} inline entries", entries.len()),
        EntrySource::File(path) => println!("  Channels: file {}", path),
        EntrySource::Api(endpoint) => println!("  Channels: endpoint {}", endpoint),
    }

    println!("  Output: {}", config.output_path());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    match config.entries_source() {
        EntrySource::Inline(entries) => {
            println!("📡 Channel Entries:");
            for entry in &entries {
                println!(
                    "  {} / {} - {} visitors, {}% -> trial, {}% -> paid, {}% churn, ${} spend",
                    entry.channel,
                    entry.medium,
                    entry.site_visitors,
                    entry.conversion_to_trial,
                    entry.conversion_to_paid,
                    entry.churn_rate,
                    entry.cost
                );
            }
            println!();
            println!(
                "📊 Expected rows: {} ({} channels x {} months)",
                entries.len() * config.months() as usize,
                entries.len(),
                config.months()
            );
        }
        EntrySource::File(path) => {
            println!("📡 Data Source Analysis:");
            println!("  File: {}", path);
            println!("  📊 Row count depends on the file contents");
        }
        EntrySource::Api(endpoint) => {
            println!("📡 Data Source Analysis:");
            println!("  Endpoint: {}", endpoint);
            println!("  📊 Row count depends on the endpoint response");
        }
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Artifacts: forecast.csv, forecast.tsv, summary.json, rows.json");

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during an actual run.");
}
