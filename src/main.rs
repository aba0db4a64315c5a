use clap::Parser;
use variant_cohorts::core::ConfigProvider;
use variant_cohorts::utils::error::ErrorSeverity;
use variant_cohorts::utils::{logger, validation::Validate};
use variant_cohorts::{CliConfig, CohortPipeline, LocalStorage, PipelineEngine, TomlConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_logger(cli.verbose);

    tracing::info!("Starting variant-cohorts");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let monitor_enabled = cli.monitor;

    match &cli.config {
        Some(path) => {
            let config = match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("❌ Could not load config file {}: {}", path, e);
                    eprintln!("❌ {}", e.user_friendly_message());
                    std::process::exit(1);
                }
            };
            run(config, monitor_enabled);
        }
        None => run(cli, monitor_enabled),
    }

    Ok(())
}

fn run<C>(config: C, monitor_enabled: bool)
where
    C: ConfigProvider + Validate + std::fmt::Debug,
{
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let report_path = config.report_path().map(str::to_string);
    let storage = LocalStorage::new(".".to_string());
    let pipeline = CohortPipeline::new(storage, config);
    let engine = PipelineEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(report) => {
            tracing::info!("✅ Aggregation completed successfully!");
            tracing::info!("📁 Combined tables saved under: {}", report.combined_partition);
            println!("✅ Aggregation completed successfully!");
            println!("📁 Combined tables saved under: {}", report.combined_partition);

            if let Some(path) = report_path {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => {
                        if let Err(e) = std::fs::write(&path, json) {
                            tracing::warn!("Could not write run report to {}: {}", path, e);
                        } else {
                            tracing::info!("📄 Run report written to {}", path);
                        }
                    }
                    Err(e) => tracing::warn!("Could not serialize run report: {}", e),
                }
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Aggregation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
