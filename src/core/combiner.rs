use crate::domain::model::{Classification, CohortId, VariantKey};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::io::{Read, Write};

/// One merged row: per-cohort counts in cohort order, plus their sum.
/// The total covers every supplied cohort, however many there are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedRow {
    pub key: VariantKey,
    pub counts: Vec<usize>,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct CombinedTable {
    pub classification: Classification,
    pub cohorts: Vec<CohortId>,
    pub rows: Vec<CombinedRow>,
}

/// Parses one per-cohort summary table into `(key, count)` pairs.
///
/// Any shape problem is returned as a plain reason string; the caller wraps
/// it with the cohort/classification context it has. A missing *file* is
/// the caller's concern. By the time bytes reach this function they must
/// parse, or the merge for this classification fails.
pub fn read_summary_counts<R: Read>(input: R) -> std::result::Result<Vec<(VariantKey, usize)>, String> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader
        .headers()
        .map_err(|e| format!("unreadable header: {}", e))?
        .clone();

    let key_idx = headers
        .iter()
        .position(|h| h == "Gene_Nucleotide")
        .ok_or_else(|| "missing column Gene_Nucleotide".to_string())?;
    let count_idx = headers
        .iter()
        .position(|h| h == "Sample_Count")
        .ok_or_else(|| "missing column Sample_Count".to_string())?;

    let mut counts = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("unreadable row: {}", e))?;
        let key = record
            .get(key_idx)
            .ok_or_else(|| "row is missing Gene_Nucleotide".to_string())?;
        let count = record
            .get(count_idx)
            .ok_or_else(|| "row is missing Sample_Count".to_string())?;
        let count: usize = count
            .parse()
            .map_err(|_| format!("Sample_Count {:?} is not a number", count))?;
        counts.push((VariantKey::from_raw(key), count));
    }

    Ok(counts)
}

/// Folds the per-cohort summaries for one classification into a single
/// table. `inputs` follows the supplied cohort order, which becomes the
/// column order; `None` marks a cohort whose summary is absent and
/// contributes zero for every key. Rows come out in first-seen order
/// across the cohort scan.
pub fn combine_classification(
    classification: &Classification,
    inputs: &[(CohortId, Option<Vec<(VariantKey, usize)>>)],
) -> CombinedTable {
    let cohort_count = inputs.len();
    let mut key_order: Vec<VariantKey> = Vec::new();
    let mut counts: HashMap<VariantKey, Vec<usize>> = HashMap::new();

    for (cohort_idx, (_, table)) in inputs.iter().enumerate() {
        let Some(table) = table else {
            continue;
        };
        for (key, count) in table {
            let entry = counts.entry(key.clone()).or_insert_with(|| {
                key_order.push(key.clone());
                vec![0; cohort_count]
            });
            entry[cohort_idx] = *count;
        }
    }

    let rows = key_order
        .into_iter()
        .map(|key| {
            let per_cohort = counts.remove(&key).expect("key recorded on first sight");
            let total = per_cohort.iter().sum();
            CombinedRow {
                key,
                counts: per_cohort,
                total,
            }
        })
        .collect();

    CombinedTable {
        classification: classification.clone(),
        cohorts: inputs.iter().map(|(cohort, _)| cohort.clone()).collect(),
        rows,
    }
}

/// Writes a combined table: `Gene_Nucleotide, <cohort…>, Total`.
pub fn write_combined<W: Write>(table: &CombinedTable, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = Vec::with_capacity(table.cohorts.len() + 2);
    header.push("Gene_Nucleotide".to_string());
    header.extend(table.cohorts.iter().cloned());
    header.push("Total".to_string());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut fields = Vec::with_capacity(row.counts.len() + 2);
        fields.push(row.key.as_str().to_string());
        fields.extend(row.counts.iter().map(|c| c.to_string()));
        fields.push(row.total.to_string());
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    Ok(())
}
