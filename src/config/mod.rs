pub mod local;
pub mod toml_config;

pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "variant-cohorts")]
#[command(about = "Aggregates per-sample variant exports into cohort and cross-cohort summaries")]
pub struct CliConfig {
    /// Directory containing one raw export directory per cohort.
    #[arg(long, default_value = ".")]
    pub input_root: String,

    /// Directory the cleaned tables and summaries are written under.
    #[arg(long, default_value = "variant_classifications")]
    pub output_root: String,

    /// Cohort directory names; their order is the combined-table column order.
    #[arg(long, value_delimiter = ',')]
    pub cohorts: Vec<String>,

    /// Also write a per-gene summary table per cohort and classification.
    #[arg(long)]
    pub gene_summaries: bool,

    /// Load settings from a TOML file instead of the flags above.
    #[arg(long)]
    pub config: Option<String>,

    /// Write a JSON run report to this path.
    #[arg(long)]
    pub report: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-stage resource usage")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn input_root(&self) -> &str {
        &self.input_root
    }

    fn output_root(&self) -> &str {
        &self.output_root
    }

    fn cohorts(&self) -> &[String] {
        &self.cohorts
    }

    fn gene_summaries(&self) -> bool {
        self.gene_summaries
    }

    fn report_path(&self) -> Option<&str> {
        self.report.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input_root", &self.input_root)?;
        validation::validate_path("output_root", &self.output_root)?;
        validation::validate_unique_ids("cohorts", &self.cohorts)?;
        Ok(())
    }
}
