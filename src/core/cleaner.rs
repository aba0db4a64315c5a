use crate::domain::model::{Classification, VariantRecord};
use crate::utils::error::{PipelineError, Result};
use std::collections::HashSet;
use std::io::{Read, Write};

/// Columns retained in cleaned tables, in output order. Everything else the
/// exporter emits is dropped.
pub const KEPT_COLUMNS: [&str; 5] = [
    "Gene",
    "Nucleotide",
    "Genoox_Classification",
    "Zygosity",
    "Inheritance_Model",
];

/// Outcome of cleaning one sample: deduplicated records plus the duplicate
/// rows that were excluded, kept for reporting.
#[derive(Debug, Clone)]
pub struct CleanResult {
    pub records: Vec<VariantRecord>,
    pub duplicates: Vec<VariantRecord>,
}

/// Merges the primary and secondary exports of one sample, in that order,
/// keeping the first row seen for each `(Gene, Nucleotide)` key. The
/// retained row is projected to [`KEPT_COLUMNS`] and scrubbed of the
/// exporter's stray quoting; duplicates are recorded raw.
///
/// The identity key is computed on the raw field values, before scrubbing,
/// so rows that differ only in quoting artifacts are not merged.
pub fn clean_tables<P: Read, S: Read>(
    primary: P,
    secondary: S,
    table_name: &str,
) -> Result<CleanResult> {
    let mut merged = Vec::new();
    read_raw_rows(primary, table_name, &mut merged)?;
    read_raw_rows(secondary, table_name, &mut merged)?;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut records = Vec::new();
    let mut duplicates = Vec::new();

    for raw in merged {
        let key = (raw[0].clone(), raw[1].clone());
        if seen.contains(&key) {
            duplicates.push(record_from_fields(&raw));
        } else {
            seen.insert(key);
            let scrubbed: [String; 5] = [
                scrub_field(&raw[0]),
                scrub_field(&raw[1]),
                scrub_field(&raw[2]),
                scrub_field(&raw[3]),
                scrub_field(&raw[4]),
            ];
            records.push(record_from_fields(&scrubbed));
        }
    }

    Ok(CleanResult {
        records,
        duplicates,
    })
}

/// Writes a cleaned table with exactly the five kept columns. The header is
/// written even when there are no records.
pub fn write_cleaned<W: Write>(records: &[VariantRecord], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(KEPT_COLUMNS)?;
    for record in records {
        writer.write_record([
            record.gene.as_str(),
            record.nucleotide.as_str(),
            record.classification.label(),
            record.zygosity.as_str(),
            record.inheritance_model.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Parses a cleaned table back into records. Used by tooling that consumes
/// cleaned tables without re-running the clean stage.
pub fn read_cleaned<R: Read>(input: R, table_name: &str) -> Result<Vec<VariantRecord>> {
    let mut rows = Vec::new();
    read_raw_rows(input, table_name, &mut rows)?;
    Ok(rows.iter().map(|raw| record_from_fields(raw)).collect())
}

/// Collapses doubled quote characters and strips one leading and one
/// trailing quote, matching what the upstream exporter leaves behind.
pub fn scrub_field(raw: &str) -> String {
    let collapsed = raw.replace("\"\"", "");
    let stripped = collapsed.strip_prefix('"').unwrap_or(&collapsed);
    let stripped = stripped.strip_suffix('"').unwrap_or(stripped);
    stripped.to_string()
}

fn record_from_fields(fields: &[String; 5]) -> VariantRecord {
    VariantRecord {
        gene: fields[0].clone(),
        nucleotide: fields[1].clone(),
        classification: Classification::parse(&fields[2]),
        zygosity: fields[3].clone(),
        inheritance_model: fields[4].clone(),
    }
}

/// Reads the five required columns of every data row into `rows`.
///
/// A table with no data rows is legal whatever its header looks like; a
/// data row that lacks any of the required fields is a fatal shape error.
/// Required fields must never be silently defaulted, since empty values
/// would corrupt the deduplication key.
fn read_raw_rows<R: Read>(input: R, table_name: &str, rows: &mut Vec<[String; 5]>) -> Result<()> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();

    let mut indices = [0usize; 5];
    let mut missing = None;
    for (slot, column) in indices.iter_mut().zip(KEPT_COLUMNS) {
        match headers.iter().position(|h| h == column) {
            Some(idx) => *slot = idx,
            None => {
                missing = Some(column);
                break;
            }
        }
    }

    for record in reader.records() {
        let record = record?;
        if let Some(column) = missing {
            return Err(PipelineError::MalformedInput {
                table: table_name.to_string(),
                message: format!("missing required column {}", column),
            });
        }
        let mut fields: [String; 5] = Default::default();
        for (slot, idx) in fields.iter_mut().zip(indices) {
            *slot = record
                .get(idx)
                .ok_or_else(|| PipelineError::MalformedInput {
                    table: table_name.to_string(),
                    message: format!("row {} is missing required fields", record.position().map(|p| p.line()).unwrap_or(0)),
                })?
                .to_string();
        }
        rows.push(fields);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Gene,Nucleotide,Genoox_Classification,Zygosity,Inheritance_Model";

    fn table(rows: &[&str]) -> Vec<u8> {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.push('\n');
        out.into_bytes()
    }

    #[test]
    fn test_primary_row_wins_over_secondary() {
        let primary = table(&["BRCA1,c.68_69delAG,PATHOGENIC,Het,AD"]);
        let secondary = table(&["BRCA1,c.68_69delAG,BENIGN,Hom,AR"]);

        let result = clean_tables(primary.as_slice(), secondary.as_slice(), "S1").unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(
            result.records[0].classification,
            Classification::Pathogenic
        );
        assert_eq!(result.records[0].zygosity, "Het");
        assert_eq!(result.duplicates.len(), 1);
        assert_eq!(result.duplicates[0].zygosity, "Hom");
    }

    #[test]
    fn test_dedup_within_one_table() {
        let primary = table(&[
            "TP53,c.524G>A,PATHOGENIC,Het,AD",
            "TP53,c.524G>A,PATHOGENIC,Het,AD",
            "TP53,c.743G>A,LIKELY_PATHOGENIC,Het,AD",
        ]);
        let secondary = table(&[]);

        let result = clean_tables(primary.as_slice(), secondary.as_slice(), "S1").unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.duplicates.len(), 1);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let primary = table(&[
            "MYH7,c.1988G>A,UNCERTAIN_SIGNIFICANCE,Het,AD",
            "MYH7,c.2167C>T,BENIGN,Het,AD",
        ]);
        let secondary = table(&["MYH7,c.1988G>A,BENIGN,Hom,AR"]);

        let first = clean_tables(primary.as_slice(), secondary.as_slice(), "S1").unwrap();
        let second = clean_tables(primary.as_slice(), secondary.as_slice(), "S1").unwrap();

        assert_eq!(first.records, second.records);

        let mut keys = HashSet::new();
        for record in &first.records {
            assert!(keys.insert(record.identity()));
        }
    }

    #[test]
    fn test_quote_artifacts_are_scrubbed() {
        assert_eq!(scrub_field("\"BRCA2\""), "BRCA2");
        assert_eq!(scrub_field("c.\"\"68del"), "c.68del");
        assert_eq!(scrub_field("plain"), "plain");
        // one quote stripped per side, not all of them
        assert_eq!(scrub_field("\"Het"), "Het");
    }

    #[test]
    fn test_empty_inputs_yield_header_only_output() {
        let primary = table(&[]);
        let secondary = table(&[]);

        let result = clean_tables(primary.as_slice(), secondary.as_slice(), "S1").unwrap();
        assert!(result.records.is_empty());
        assert!(result.duplicates.is_empty());

        let mut buf = Vec::new();
        write_cleaned(&result.records, &mut buf).unwrap();
        let written = String::from_utf8(buf).unwrap();
        assert_eq!(written.trim_end(), HEADER);
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let truncated = b"Gene,Nucleotide,Zygosity\nBRCA1,c.1A>T,Het\n";
        let secondary = table(&[]);

        let err = clean_tables(&truncated[..], secondary.as_slice(), "S1").unwrap_err();
        match err {
            PipelineError::MalformedInput { table, message } => {
                assert_eq!(table, "S1");
                assert!(message.contains("Genoox_Classification"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_headerless_empty_file_is_legal() {
        let empty: &[u8] = b"";
        let secondary = table(&["PKP2,c.2146-1G>C,PATHOGENIC,Het,AD"]);

        let result = clean_tables(empty, secondary.as_slice(), "S1").unwrap();
        assert_eq!(result.records.len(), 1);
    }

    #[test]
    fn test_extraneous_columns_are_ignored() {
        let with_extra =
            b"Chrom,Gene,Nucleotide,Genoox_Classification,Zygosity,Inheritance_Model,Depth\n\
              17,BRCA1,c.68_69delAG,PATHOGENIC,Het,AD,102\n";
        let secondary = table(&[]);

        let result = clean_tables(&with_extra[..], secondary.as_slice(), "S1").unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].gene, "BRCA1");
        assert_eq!(result.records[0].inheritance_model, "AD");
    }
}
