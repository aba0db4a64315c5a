use crate::core::{cleaner, combiner, counter};
use crate::domain::model::{
    CleanOutcome, CleanedCohort, CleanedSample, Classification, CountOutcome,
};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{PipelineError, Result};
use regex::Regex;

/// Production pipeline: wires sample discovery, the three aggregation
/// stages and table persistence together through the storage and config
/// ports. All paths are built here; the stage functions in `cleaner`,
/// `counter` and `combiner` never see the storage layout.
pub struct CohortPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

/// One discovered sample: the exporter writes two files per sample, the
/// default variant export and the UTR export.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SampleExport {
    sample_id: String,
    primary: String,
    secondary: String,
}

impl<S: Storage, C: ConfigProvider> CohortPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn cleaned_table_path(&self, cohort: &str, sample_id: &str) -> String {
        format!(
            "{}/cleaned/{}/{}.csv",
            self.config.output_root(),
            cohort,
            sample_id
        )
    }

    fn summary_table_path(&self, cohort: &str, classification: &Classification) -> String {
        format!(
            "{}/{}/{}_{}_gene_nucleotide.csv",
            self.config.output_root(),
            cohort,
            cohort,
            classification.label()
        )
    }

    fn gene_table_path(&self, cohort: &str, classification: &Classification) -> String {
        format!(
            "{}/{}/{}_{}_gene.csv",
            self.config.output_root(),
            cohort,
            cohort,
            classification.label()
        )
    }

    fn combined_table_path(&self, classification: &Classification) -> String {
        format!(
            "{}/all_cohorts/combined_cohorts_{}_gene_nucleotide.csv",
            self.config.output_root(),
            classification.label()
        )
    }

    /// Resolves the `(sample, primary, secondary)` triples for one cohort
    /// directory from the exporter's naming convention. A primary export
    /// without its UTR counterpart is a truncated upload and fatal.
    fn discover_samples(&self, cohort: &str, files: &[String]) -> Result<Vec<SampleExport>> {
        let pattern = Regex::new(r"^(.+)_single_snp_variants\.csv$").unwrap();
        let raw_dir = format!("{}/{}", self.config.input_root(), cohort);

        let mut exports = Vec::new();
        for file in files {
            let Some(captures) = pattern.captures(file) else {
                continue;
            };
            let sample_id = captures[1].to_string();
            let primary = format!("{}/{}", raw_dir, file);
            let secondary = format!("{}/{}_single_snp_variants (1).csv", raw_dir, sample_id);

            if !self.storage.file_exists(&secondary) {
                return Err(PipelineError::MalformedInput {
                    table: primary,
                    message: format!(
                        "UTR export {}_single_snp_variants (1).csv is missing",
                        sample_id
                    ),
                });
            }

            exports.push(SampleExport {
                sample_id,
                primary,
                secondary,
            });
        }

        exports.sort();
        exports.dedup();
        Ok(exports)
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for CohortPipeline<S, C> {
    fn clean(&self) -> Result<CleanOutcome> {
        let mut cohorts = Vec::new();
        let mut duplicate_rows = 0;

        for cohort in self.config.cohorts() {
            let raw_dir = format!("{}/{}", self.config.input_root(), cohort);
            if !self.storage.file_exists(&raw_dir) {
                tracing::warn!("Skipping {}: directory does not exist", raw_dir);
                continue;
            }

            let files = self.storage.list_dir(&raw_dir)?;
            if files.is_empty() {
                tracing::info!("Skipping {}: directory is empty", raw_dir);
                continue;
            }

            let exports = self.discover_samples(cohort, &files)?;
            if exports.is_empty() {
                tracing::info!("No valid sample exports found in {}", raw_dir);
                continue;
            }

            tracing::debug!("Cohort {}: {} samples discovered", cohort, exports.len());

            let mut samples = Vec::new();
            for export in exports {
                let primary = self.storage.read_file(&export.primary)?;
                let secondary = self.storage.read_file(&export.secondary)?;
                let result =
                    cleaner::clean_tables(primary.as_slice(), secondary.as_slice(), &export.primary)?;

                if result.duplicates.is_empty() {
                    tracing::info!("No duplicates found in {}", export.primary);
                } else {
                    for duplicate in &result.duplicates {
                        tracing::info!(
                            "Duplicate entry in {}: {} {} ({})",
                            export.primary,
                            duplicate.gene,
                            duplicate.nucleotide,
                            duplicate.classification
                        );
                    }
                }
                duplicate_rows += result.duplicates.len();

                let mut buf = Vec::new();
                cleaner::write_cleaned(&result.records, &mut buf)?;
                self.storage
                    .write_file(&self.cleaned_table_path(cohort, &export.sample_id), &buf)?;

                samples.push(CleanedSample {
                    sample_id: export.sample_id,
                    records: result.records,
                });
            }

            cohorts.push(CleanedCohort {
                cohort: cohort.clone(),
                samples,
            });
        }

        Ok(CleanOutcome {
            cohorts,
            duplicate_rows,
        })
    }

    fn count(&self, cleaned: CleanOutcome) -> Result<CountOutcome> {
        let mut cohorts_counted = Vec::new();
        let mut tables_written = 0;
        let mut unclassified_rows = 0;

        for cohort in &cleaned.cohorts {
            let summaries = counter::count_cohort(&cohort.samples);

            for (sample_id, label) in &summaries.unclassified {
                tracing::warn!(
                    "Dropping record with unrecognized classification {:?} from sample {} in cohort {}",
                    label,
                    sample_id,
                    cohort.cohort
                );
            }
            unclassified_rows += summaries.unclassified.len();

            for classification in &Classification::KNOWN {
                let rows = summaries.variant_rows(classification);
                let mut buf = Vec::new();
                counter::write_variant_summary(&rows, &mut buf)?;
                self.storage
                    .write_file(&self.summary_table_path(&cohort.cohort, classification), &buf)?;
                tables_written += 1;

                if self.config.gene_summaries() {
                    let gene_rows = summaries.gene_rows(classification);
                    let mut buf = Vec::new();
                    counter::write_gene_summary(&gene_rows, &mut buf)?;
                    self.storage
                        .write_file(&self.gene_table_path(&cohort.cohort, classification), &buf)?;
                    tables_written += 1;
                }
            }

            cohorts_counted.push(cohort.cohort.clone());
        }

        Ok(CountOutcome {
            cohorts_counted,
            tables_written,
            unclassified_rows,
        })
    }

    fn combine(&self, counted: CountOutcome) -> Result<String> {
        let cohorts = self.config.cohorts();
        tracing::debug!(
            "Combining {} configured cohorts ({} counted this run)",
            cohorts.len(),
            counted.cohorts_counted.len()
        );

        for classification in &Classification::KNOWN {
            let mut inputs = Vec::with_capacity(cohorts.len());

            for cohort in cohorts {
                let path = self.summary_table_path(cohort, classification);
                if !self.storage.file_exists(&path) {
                    tracing::warn!(
                        "Summary table {} does not exist; counting cohort {} as zero for {}",
                        path,
                        cohort,
                        classification
                    );
                    inputs.push((cohort.clone(), None));
                    continue;
                }

                let data = self.storage.read_file(&path)?;
                let table = combiner::read_summary_counts(data.as_slice()).map_err(|reason| {
                    PipelineError::CorruptSummary {
                        cohort: cohort.clone(),
                        classification: classification.label().to_string(),
                        reason,
                    }
                })?;
                inputs.push((cohort.clone(), Some(table)));
            }

            let table = combiner::combine_classification(classification, &inputs);
            let mut buf = Vec::new();
            combiner::write_combined(&table, &mut buf)?;
            self.storage
                .write_file(&self.combined_table_path(classification), &buf)?;
        }

        Ok(format!("{}/all_cohorts", self.config.output_root()))
    }
}
