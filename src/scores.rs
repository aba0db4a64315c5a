//! Companion tooling for the prioritisation comparison: pulls pathogenicity
//! scores and coding-change notations out of an annotator's tab-separated
//! export, and joins those scores back onto cleaned variant tables.

use crate::utils::error::{PipelineError, Result};
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

pub const SCORE_COLUMNS: [&str; 3] = ["Gene", "Nucleotide", "VIPR_Pathogenicity"];

/// One extracted score observation: a gene, one coding change pulled out of
/// the annotation text, and the prioritisation score carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub gene: String,
    pub nucleotide: String,
    pub score: String,
}

/// Extracts every substring starting at `c.` and running to the earliest
/// terminator (or the end of the text). Annotation fields pack several
/// transcript notations into one value, so one field can yield several
/// coding changes.
pub fn extract_coding_changes(text: &str, terminators: &[char]) -> Vec<String> {
    let mut changes = Vec::new();
    let mut search_from = 0;

    while let Some(found) = text[search_from..].find("c.") {
        let start = search_from + found;
        let rest = &text[start..];
        let end = terminators
            .iter()
            .filter_map(|&t| rest.find(t))
            .min()
            .unwrap_or(rest.len());

        changes.push(rest[..end].to_string());
        search_from = start + end;
    }

    changes
}

/// Reads the annotator's tab-separated export and emits one [`ScoreRow`]
/// per extracted coding change.
///
/// The annotator fills exactly one of the two annotation fields per row and
/// writes `"."` in the other; which one decides the terminator set. Rows
/// with both fields populated carry no usable coding notation and are
/// skipped, matching the upstream convention.
pub fn extract_scores<R: Read>(input: R, table_name: &str) -> Result<Vec<ScoreRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::MalformedInput {
                table: table_name.to_string(),
                message: format!("missing required column {}", name),
            })
    };

    let gene_idx = column("Gene.refGene")?;
    let score_idx = column(".pred_P_LP")?;
    let gene_detail_idx = column("GeneDetail.refGene")?;
    let aa_change_idx = column("AAChange.refGene")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default();

        let gene = field(gene_idx);
        let score = field(score_idx);
        let gene_detail = field(gene_detail_idx);
        let aa_change = field(aa_change_idx);

        let changes = if gene_detail == "." {
            extract_coding_changes(aa_change, &[':'])
        } else if aa_change == "." {
            extract_coding_changes(gene_detail, &[';', '\n'])
        } else {
            Vec::new()
        };

        for nucleotide in changes {
            rows.push(ScoreRow {
                gene: gene.to_string(),
                nucleotide,
                score: score.to_string(),
            });
        }
    }

    Ok(rows)
}

pub fn write_scores<W: Write>(rows: &[ScoreRow], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(SCORE_COLUMNS)?;
    for row in rows {
        writer.write_record([row.gene.as_str(), row.nucleotide.as_str(), row.score.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a score table back as a `(gene, nucleotide) -> score` lookup.
pub fn read_score_table<R: Read>(
    input: R,
    table_name: &str,
) -> Result<HashMap<(String, String), String>> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::MalformedInput {
                table: table_name.to_string(),
                message: format!("missing required column {}", name),
            })
    };

    let gene_idx = column("Gene")?;
    let nucleotide_idx = column("Nucleotide")?;
    let score_idx = column("VIPR_Pathogenicity")?;

    let mut scores = HashMap::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        scores.insert((field(gene_idx), field(nucleotide_idx)), field(score_idx));
    }

    Ok(scores)
}

/// A generic delimited table held in memory, used by the join tool.
#[derive(Debug, Clone)]
pub struct MergedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    gene_idx: usize,
    nucleotide_idx: usize,
}

/// Merges several same-schema tables, keeping the first row seen for each
/// `(Gene, Nucleotide)` key across the inputs, in input order.
pub fn merge_tables<R: Read>(inputs: impl IntoIterator<Item = (String, R)>) -> Result<MergedTable> {
    let mut iter = inputs.into_iter();
    let Some((first_name, first_input)) = iter.next() else {
        return Err(PipelineError::MalformedInput {
            table: "<input directory>".to_string(),
            message: "no input tables to merge".to_string(),
        });
    };

    let mut reader = csv::Reader::from_reader(first_input);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let column = |col: &str| {
        headers
            .iter()
            .position(|h| h == col)
            .ok_or_else(|| PipelineError::MalformedInput {
                table: first_name.clone(),
                message: format!("missing required column {}", col),
            })
    };
    let gene_idx = column("Gene")?;
    let nucleotide_idx = column("Nucleotide")?;

    let mut table = MergedTable {
        headers,
        rows: Vec::new(),
        gene_idx,
        nucleotide_idx,
    };
    let mut seen = HashSet::new();
    append_rows(&mut table, &mut seen, &mut reader)?;

    for (name, input) in iter {
        let mut reader = csv::Reader::from_reader(input);
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers != table.headers {
            return Err(PipelineError::MalformedInput {
                table: name,
                message: "header does not match the first input table".to_string(),
            });
        }
        append_rows(&mut table, &mut seen, &mut reader)?;
    }

    Ok(table)
}

fn append_rows<R: Read>(
    table: &mut MergedTable,
    seen: &mut HashSet<(String, String)>,
    reader: &mut csv::Reader<R>,
) -> Result<()> {
    for record in reader.records() {
        let record = record?;
        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        let key = (
            fields.get(table.gene_idx).cloned().unwrap_or_default(),
            fields.get(table.nucleotide_idx).cloned().unwrap_or_default(),
        );
        if seen.insert(key) {
            table.rows.push(fields);
        }
    }
    Ok(())
}

/// Appends a `VIPR_Pathogenicity` column; rows whose key has no score get
/// an empty value rather than being dropped.
pub fn attach_scores(table: &mut MergedTable, scores: &HashMap<(String, String), String>) {
    table.headers.push("VIPR_Pathogenicity".to_string());
    for row in &mut table.rows {
        let key = (
            row.get(table.gene_idx).cloned().unwrap_or_default(),
            row.get(table.nucleotide_idx).cloned().unwrap_or_default(),
        );
        row.push(scores.get(&key).cloned().unwrap_or_default());
    }
}

pub fn write_table<W: Write>(table: &MergedTable, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
