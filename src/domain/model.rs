use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type SampleId = String;
pub type CohortId = String;

/// Genoox pathogenicity taxonomy. Closed set of eight categories; anything
/// else the exporter emits is carried as `Unclassified` with its original
/// label so it can be counted and logged instead of vanishing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Pathogenic,
    LikelyPathogenic,
    UncertainSignificance,
    PossiblyPathogenicLow,
    PossiblyPathogenicModerate,
    PossiblyBenign,
    LikelyBenign,
    Benign,
    Unclassified(String),
}

impl Classification {
    pub const KNOWN: [Classification; 8] = [
        Classification::Pathogenic,
        Classification::LikelyPathogenic,
        Classification::UncertainSignificance,
        Classification::PossiblyPathogenicLow,
        Classification::PossiblyPathogenicModerate,
        Classification::PossiblyBenign,
        Classification::LikelyBenign,
        Classification::Benign,
    ];

    pub fn parse(label: &str) -> Self {
        match label {
            "PATHOGENIC" => Classification::Pathogenic,
            "LIKELY_PATHOGENIC" => Classification::LikelyPathogenic,
            "UNCERTAIN_SIGNIFICANCE" => Classification::UncertainSignificance,
            "POSSIBLY_PATHOGENIC_LOW" => Classification::PossiblyPathogenicLow,
            "POSSIBLY_PATHOGENIC_MODERATE" => Classification::PossiblyPathogenicModerate,
            "POSSIBLY_BENIGN" => Classification::PossiblyBenign,
            "LIKELY_BENIGN" => Classification::LikelyBenign,
            "BENIGN" => Classification::Benign,
            other => Classification::Unclassified(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Classification::Pathogenic => "PATHOGENIC",
            Classification::LikelyPathogenic => "LIKELY_PATHOGENIC",
            Classification::UncertainSignificance => "UNCERTAIN_SIGNIFICANCE",
            Classification::PossiblyPathogenicLow => "POSSIBLY_PATHOGENIC_LOW",
            Classification::PossiblyPathogenicModerate => "POSSIBLY_PATHOGENIC_MODERATE",
            Classification::PossiblyBenign => "POSSIBLY_BENIGN",
            Classification::LikelyBenign => "LIKELY_BENIGN",
            Classification::Benign => "BENIGN",
            Classification::Unclassified(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Classification::Unclassified(_))
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Composite join key `<gene>_<nucleotide>` used by every stage downstream
/// of cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantKey(String);

impl VariantKey {
    pub fn new(gene: &str, nucleotide: &str) -> Self {
        VariantKey(format!("{}_{}", gene, nucleotide))
    }

    /// Wraps a key read back from a summary table.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        VariantKey(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One variant observation for one sample, projected to the five columns
/// the pipeline keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub gene: String,
    pub nucleotide: String,
    pub classification: Classification,
    pub zygosity: String,
    pub inheritance_model: String,
}

impl VariantRecord {
    /// Identity key for within-sample deduplication.
    pub fn identity(&self) -> (String, String) {
        (self.gene.clone(), self.nucleotide.clone())
    }

    pub fn variant_key(&self) -> VariantKey {
        VariantKey::new(&self.gene, &self.nucleotide)
    }
}

/// Cleaned records for one sample; no duplicate `(gene, nucleotide)` keys.
#[derive(Debug, Clone)]
pub struct CleanedSample {
    pub sample_id: SampleId,
    pub records: Vec<VariantRecord>,
}

#[derive(Debug, Clone)]
pub struct CleanedCohort {
    pub cohort: CohortId,
    pub samples: Vec<CleanedSample>,
}

/// Result of the clean stage, handed to the count stage.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub cohorts: Vec<CleanedCohort>,
    pub duplicate_rows: usize,
}

impl CleanOutcome {
    pub fn sample_count(&self) -> usize {
        self.cohorts.iter().map(|c| c.samples.len()).sum()
    }

    pub fn record_count(&self) -> usize {
        self.cohorts
            .iter()
            .flat_map(|c| c.samples.iter())
            .map(|s| s.records.len())
            .sum()
    }
}

/// Result of the count stage.
#[derive(Debug, Clone)]
pub struct CountOutcome {
    pub cohorts_counted: Vec<CohortId>,
    pub tables_written: usize,
    pub unclassified_rows: usize,
}

/// Per-run summary, serialized to JSON when a report path is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cohorts_processed: usize,
    pub samples_cleaned: usize,
    pub records_kept: usize,
    pub duplicate_rows: usize,
    pub unclassified_rows: usize,
    pub summary_tables_written: usize,
    pub combined_partition: String,
}
