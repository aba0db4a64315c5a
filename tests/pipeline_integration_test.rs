use tempfile::TempDir;
use variant_cohorts::core::Pipeline;
use variant_cohorts::{CliConfig, CohortPipeline, LocalStorage, PipelineEngine, PipelineError};

const HEADER: &str = "Gene,Nucleotide,Genoox_Classification,Zygosity,Inheritance_Model";

fn config(cohorts: &[&str]) -> CliConfig {
    CliConfig {
        input_root: "raw".to_string(),
        output_root: "variant_classifications".to_string(),
        cohorts: cohorts.iter().map(|c| c.to_string()).collect(),
        gene_summaries: false,
        config: None,
        report: None,
        verbose: false,
        monitor: false,
    }
}

fn write_sample(dir: &TempDir, cohort: &str, sample: &str, primary: &str, utr: &str) {
    let cohort_dir = dir.path().join("raw").join(cohort);
    std::fs::create_dir_all(&cohort_dir).unwrap();
    std::fs::write(
        cohort_dir.join(format!("{}_single_snp_variants.csv", sample)),
        primary,
    )
    .unwrap();
    std::fs::write(
        cohort_dir.join(format!("{}_single_snp_variants (1).csv", sample)),
        utr,
    )
    .unwrap();
}

fn read_output(dir: &TempDir, rel: &str) -> String {
    std::fs::read_to_string(dir.path().join("variant_classifications").join(rel)).unwrap()
}

#[test]
fn test_end_to_end_primary_beats_secondary() {
    let dir = TempDir::new().unwrap();

    // the same (Gene, Nucleotide) key in both exports, with conflicting
    // classifications: the primary export is scanned first and wins
    write_sample(
        &dir,
        "Cohort_1",
        "S1",
        &format!("{}\nBRCA1,c.68_69delAG,PATHOGENIC,Het,AD\n", HEADER),
        &format!("{}\nBRCA1,c.68_69delAG,BENIGN,Hom,AR\n", HEADER),
    );

    let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
    let pipeline = CohortPipeline::new(storage, config(&["Cohort_1"]));
    let engine = PipelineEngine::new(pipeline);

    let report = engine.run().unwrap();

    assert_eq!(report.cohorts_processed, 1);
    assert_eq!(report.samples_cleaned, 1);
    assert_eq!(report.records_kept, 1);
    assert_eq!(report.duplicate_rows, 1);
    assert_eq!(report.summary_tables_written, 8);

    let cleaned = read_output(&dir, "cleaned/Cohort_1/S1.csv");
    assert!(cleaned.contains("BRCA1,c.68_69delAG,PATHOGENIC,Het,AD"));
    assert!(!cleaned.contains("BENIGN"));

    let pathogenic = read_output(&dir, "Cohort_1/Cohort_1_PATHOGENIC_gene_nucleotide.csv");
    let mut lines = pathogenic.lines();
    assert_eq!(lines.next(), Some("Gene_Nucleotide,Sample_Count,Samples"));
    assert_eq!(lines.next(), Some("BRCA1_c.68_69delAG,1,S1"));

    // the BENIGN summary exists but is header-only
    let benign = read_output(&dir, "Cohort_1/Cohort_1_BENIGN_gene_nucleotide.csv");
    assert_eq!(benign.trim_end(), "Gene_Nucleotide,Sample_Count,Samples");

    let combined = read_output(
        &dir,
        "all_cohorts/combined_cohorts_PATHOGENIC_gene_nucleotide.csv",
    );
    let mut lines = combined.lines();
    assert_eq!(lines.next(), Some("Gene_Nucleotide,Cohort_1,Total"));
    assert_eq!(lines.next(), Some("BRCA1_c.68_69delAG,1,1"));
}

#[test]
fn test_summary_rows_sorted_by_sample_count() {
    let dir = TempDir::new().unwrap();

    let shared = "PKP2,c.2146-1G>C,PATHOGENIC,Het,AD";
    write_sample(
        &dir,
        "Cohort_1",
        "S1",
        &format!("{}\n{}\nBRCA1,c.68_69delAG,PATHOGENIC,Het,AD\n", HEADER, shared),
        &format!("{}\n", HEADER),
    );
    write_sample(
        &dir,
        "Cohort_1",
        "S2",
        &format!("{}\n{}\n", HEADER, shared),
        &format!("{}\n", HEADER),
    );

    let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
    let pipeline = CohortPipeline::new(storage, config(&["Cohort_1"]));
    PipelineEngine::new(pipeline).run().unwrap();

    let pathogenic = read_output(&dir, "Cohort_1/Cohort_1_PATHOGENIC_gene_nucleotide.csv");
    let lines: Vec<&str> = pathogenic.lines().collect();

    assert_eq!(lines[1], "PKP2_c.2146-1G>C,2,\"S1, S2\"");
    assert_eq!(lines[2], "BRCA1_c.68_69delAG,1,S1");
}

#[test]
fn test_missing_cohort_is_zero_filled_in_combined_table() {
    let dir = TempDir::new().unwrap();

    write_sample(
        &dir,
        "Cohort_1",
        "S1",
        &format!("{}\nGENEX,c.1A>T,PATHOGENIC,Het,AD\n", HEADER),
        &format!("{}\n", HEADER),
    );
    // Cohort_2 has no directory at all

    let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
    let pipeline = CohortPipeline::new(storage, config(&["Cohort_1", "Cohort_2"]));
    let report = PipelineEngine::new(pipeline).run().unwrap();

    assert_eq!(report.cohorts_processed, 1);

    let combined = read_output(
        &dir,
        "all_cohorts/combined_cohorts_PATHOGENIC_gene_nucleotide.csv",
    );
    let mut lines = combined.lines();
    assert_eq!(lines.next(), Some("Gene_Nucleotide,Cohort_1,Cohort_2,Total"));
    assert_eq!(lines.next(), Some("GENEX_c.1A>T,1,0,1"));
}

#[test]
fn test_empty_cohort_directory_is_skipped() {
    let dir = TempDir::new().unwrap();

    std::fs::create_dir_all(dir.path().join("raw").join("Cohort_1")).unwrap();
    write_sample(
        &dir,
        "Cohort_2",
        "S1",
        &format!("{}\nTP53,c.524G>A,BENIGN,Het,AD\n", HEADER),
        &format!("{}\n", HEADER),
    );

    let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
    let pipeline = CohortPipeline::new(storage, config(&["Cohort_1", "Cohort_2"]));
    let report = PipelineEngine::new(pipeline).run().unwrap();

    assert_eq!(report.cohorts_processed, 1);
    assert_eq!(report.samples_cleaned, 1);
}

#[test]
fn test_unclassified_records_are_counted_not_aggregated() {
    let dir = TempDir::new().unwrap();

    write_sample(
        &dir,
        "Cohort_1",
        "S1",
        &format!(
            "{}\nBRCA1,c.1A>T,VUS_MAYBE,Het,AD\nBRCA1,c.2C>G,PATHOGENIC,Het,AD\n",
            HEADER
        ),
        &format!("{}\n", HEADER),
    );

    let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
    let pipeline = CohortPipeline::new(storage, config(&["Cohort_1"]));
    let report = PipelineEngine::new(pipeline).run().unwrap();

    assert_eq!(report.unclassified_rows, 1);
    assert_eq!(report.records_kept, 2);

    let pathogenic = read_output(&dir, "Cohort_1/Cohort_1_PATHOGENIC_gene_nucleotide.csv");
    assert!(pathogenic.contains("BRCA1_c.2C>G,1,S1"));
    assert!(!pathogenic.contains("c.1A>T"));
}

#[test]
fn test_malformed_input_table_fails_the_run() {
    let dir = TempDir::new().unwrap();

    let cohort_dir = dir.path().join("raw").join("Cohort_1");
    std::fs::create_dir_all(&cohort_dir).unwrap();
    std::fs::write(
        cohort_dir.join("S1_single_snp_variants.csv"),
        "Gene,Nucleotide,Zygosity\nBRCA1,c.1A>T,Het\n",
    )
    .unwrap();
    std::fs::write(
        cohort_dir.join("S1_single_snp_variants (1).csv"),
        format!("{}\n", HEADER),
    )
    .unwrap();

    let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
    let pipeline = CohortPipeline::new(storage, config(&["Cohort_1"]));
    let err = PipelineEngine::new(pipeline).run().unwrap_err();

    assert!(matches!(err, PipelineError::MalformedInput { .. }));
}

#[test]
fn test_gene_summaries_written_when_enabled() {
    let dir = TempDir::new().unwrap();

    write_sample(
        &dir,
        "Cohort_1",
        "S1",
        &format!(
            "{}\nMYH7,c.1988G>A,LIKELY_PATHOGENIC,Het,AD\nMYH7,c.2167C>T,LIKELY_PATHOGENIC,Het,AD\n",
            HEADER
        ),
        &format!("{}\n", HEADER),
    );

    let mut cfg = config(&["Cohort_1"]);
    cfg.gene_summaries = true;

    let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
    let pipeline = CohortPipeline::new(storage, cfg);
    let report = PipelineEngine::new(pipeline).run().unwrap();

    // 8 variant summaries + 8 gene summaries
    assert_eq!(report.summary_tables_written, 16);

    let gene = read_output(&dir, "Cohort_1/Cohort_1_LIKELY_PATHOGENIC_gene.csv");
    let mut lines = gene.lines();
    assert_eq!(lines.next(), Some("Gene,Sample_Count,Samples"));
    // one sample with two variants in the gene counts once
    assert_eq!(lines.next(), Some("MYH7,1,S1"));
}

#[test]
fn test_rerunning_combine_against_persisted_summaries() {
    let dir = TempDir::new().unwrap();

    write_sample(
        &dir,
        "Cohort_1",
        "S1",
        &format!("{}\nGENEX,c.1A>T,PATHOGENIC,Het,AD\n", HEADER),
        &format!("{}\n", HEADER),
    );

    let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
    let pipeline = CohortPipeline::new(storage, config(&["Cohort_1"]));
    PipelineEngine::new(pipeline).run().unwrap();

    // a fresh pipeline combining from the tables the first run persisted,
    // without re-cleaning or re-counting
    let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
    let pipeline = CohortPipeline::new(storage, config(&["Cohort_1"]));
    let partition = pipeline
        .combine(variant_cohorts::core::CountOutcome {
            cohorts_counted: Vec::new(),
            tables_written: 0,
            unclassified_rows: 0,
        })
        .unwrap();

    assert_eq!(partition, "variant_classifications/all_cohorts");
    let combined = read_output(
        &dir,
        "all_cohorts/combined_cohorts_PATHOGENIC_gene_nucleotide.csv",
    );
    assert!(combined.contains("GENEX_c.1A>T,1,1"));
}
