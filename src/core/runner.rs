use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives one extract -> project -> load pass over a pipeline.
pub struct ForecastRunner<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ForecastRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        println!("Starting forecast run...");

        // Extract
        println!("Collecting channel entries...");
        let worksheet = self.pipeline.extract().await?;
        println!("Collected {} channel entries", worksheet.len());
        self.monitor.log_stats("Extract");

        // Transform
        println!("Projecting forecast...");
        let output = self.pipeline.transform(worksheet).await?;
        println!("Projected {} forecast rows", output.rows.len());
        self.monitor.log_stats("Project");

        // 摘要面板 (與逐列報表分開顯示)
        let summary = &output.summary;
        println!();
        println!("  Total Customers: {:.2}", summary.total_customers);
        println!("  Blended CAC:     ${:.2}", summary.blended_cac());
        println!("  Total MRR:       ${:.2}", summary.total_mrr);
        println!("  Total ARR:       ${:.2}", summary.total_arr());
        println!();

        // Load
        println!("Writing report...");
        let output_path = self.pipeline.load(output).await?;
        println!("Report saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
