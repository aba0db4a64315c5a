use crate::domain::model::{CleanedSample, Classification, SampleId, VariantKey};
use crate::utils::error::Result;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;

pub const VARIANT_SUMMARY_COLUMNS: [&str; 3] = ["Gene_Nucleotide", "Sample_Count", "Samples"];
pub const GENE_SUMMARY_COLUMNS: [&str; 3] = ["Gene", "Sample_Count", "Samples"];

/// One output row of a per-cohort variant summary: which samples carried
/// this variant with this classification. `sample_count` is the length of
/// `samples`; samples are listed in file-processing order and are not
/// deduplicated, since each sample is an independent observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSummaryRow {
    pub key: VariantKey,
    pub sample_count: usize,
    pub samples: Vec<SampleId>,
}

/// Gene-level counterpart, with samples deduplicated: a sample carrying two
/// distinct variants in the same gene counts once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneSummaryRow {
    pub gene: String,
    pub sample_count: usize,
    pub samples: Vec<SampleId>,
}

/// Per-cohort aggregates, one pair of mappings per known classification.
#[derive(Debug, Default)]
pub struct CohortSummaries {
    variant_samples: HashMap<Classification, HashMap<VariantKey, Vec<SampleId>>>,
    gene_samples: HashMap<Classification, HashMap<String, BTreeSet<SampleId>>>,
    /// `(sample_id, label)` of every record whose classification is outside
    /// the known taxonomy. Dropped from the aggregates, surfaced upstream.
    pub unclassified: Vec<(SampleId, String)>,
}

impl CohortSummaries {
    /// Summary rows for one classification, sorted by sample count
    /// descending; ties broken by variant key ascending.
    pub fn variant_rows(&self, classification: &Classification) -> Vec<VariantSummaryRow> {
        let mut rows: Vec<VariantSummaryRow> = self
            .variant_samples
            .get(classification)
            .map(|by_key| {
                by_key
                    .iter()
                    .map(|(key, samples)| VariantSummaryRow {
                        key: key.clone(),
                        sample_count: samples.len(),
                        samples: samples.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            b.sample_count
                .cmp(&a.sample_count)
                .then_with(|| a.key.cmp(&b.key))
        });
        rows
    }

    pub fn gene_rows(&self, classification: &Classification) -> Vec<GeneSummaryRow> {
        let mut rows: Vec<GeneSummaryRow> = self
            .gene_samples
            .get(classification)
            .map(|by_gene| {
                by_gene
                    .iter()
                    .map(|(gene, samples)| GeneSummaryRow {
                        gene: gene.clone(),
                        sample_count: samples.len(),
                        samples: samples.iter().cloned().collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            b.sample_count
                .cmp(&a.sample_count)
                .then_with(|| a.gene.cmp(&b.gene))
        });
        rows
    }
}

/// Folds one cohort's cleaned samples into per-classification aggregates.
/// Samples are consumed in the given order; that order is what the summary
/// sample lists preserve.
pub fn count_cohort(samples: &[CleanedSample]) -> CohortSummaries {
    let mut summaries = CohortSummaries::default();

    for sample in samples {
        for record in &sample.records {
            if !record.classification.is_known() {
                summaries.unclassified.push((
                    sample.sample_id.clone(),
                    record.classification.label().to_string(),
                ));
                continue;
            }

            summaries
                .variant_samples
                .entry(record.classification.clone())
                .or_default()
                .entry(record.variant_key())
                .or_default()
                .push(sample.sample_id.clone());

            summaries
                .gene_samples
                .entry(record.classification.clone())
                .or_default()
                .entry(record.gene.clone())
                .or_default()
                .insert(sample.sample_id.clone());
        }
    }

    summaries
}

pub fn write_variant_summary<W: Write>(rows: &[VariantSummaryRow], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(VARIANT_SUMMARY_COLUMNS)?;
    for row in rows {
        let count = row.sample_count.to_string();
        let samples = row.samples.join(", ");
        writer.write_record([row.key.as_str(), count.as_str(), samples.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_gene_summary<W: Write>(rows: &[GeneSummaryRow], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(GENE_SUMMARY_COLUMNS)?;
    for row in rows {
        let count = row.sample_count.to_string();
        let samples = row.samples.join(", ");
        writer.write_record([row.gene.as_str(), count.as_str(), samples.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
