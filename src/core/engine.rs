use crate::domain::model::RunReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;

/// Drives the three stages in order. Each stage fully consumes its input
/// before the next starts; the persisted tables are the recovery boundary
/// between them.
pub struct PipelineEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> PipelineEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(enabled),
        }
    }

    pub fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();

        tracing::info!("Cleaning sample exports...");
        let cleaned = self.pipeline.clean()?;
        let cohorts_processed = cleaned.cohorts.len();
        let samples_cleaned = cleaned.sample_count();
        let records_kept = cleaned.record_count();
        let duplicate_rows = cleaned.duplicate_rows;
        tracing::info!(
            "Cleaned {} samples across {} cohorts ({} records kept, {} duplicate rows removed)",
            samples_cleaned,
            cohorts_processed,
            records_kept,
            duplicate_rows
        );
        self.monitor.log_stats("clean");

        tracing::info!("Counting variants per cohort...");
        let counted = self.pipeline.count(cleaned)?;
        let summary_tables_written = counted.tables_written;
        let unclassified_rows = counted.unclassified_rows;
        tracing::info!(
            "Wrote {} summary tables ({} unclassified rows dropped)",
            summary_tables_written,
            unclassified_rows
        );
        self.monitor.log_stats("count");

        tracing::info!("Combining cohorts...");
        let combined_partition = self.pipeline.combine(counted)?;
        tracing::info!("Combined tables saved under: {}", combined_partition);
        self.monitor.log_stats("combine");
        self.monitor.log_final_stats();

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            cohorts_processed,
            samples_cleaned,
            records_kept,
            duplicate_rows,
            unclassified_rows,
            summary_tables_written,
            combined_partition,
        })
    }
}
