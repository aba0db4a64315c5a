use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use variant_cohorts::scores;

/// Merges a directory of cleaned variant tables (first-seen wins on the
/// `(Gene, Nucleotide)` key) and left-joins the prioritisation scores
/// produced by extract-scores.
#[derive(Parser, Debug)]
#[command(name = "join-scores")]
#[command(about = "Join prioritisation scores onto cleaned variant tables")]
struct Cli {
    /// Directory of cleaned per-sample CSV tables to merge.
    #[arg(long)]
    tables: PathBuf,

    /// Score table produced by extract-scores.
    #[arg(long)]
    scores: PathBuf,

    /// Output CSV path.
    #[arg(long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(&cli.tables)
        .with_context(|| format!("listing {}", cli.tables.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            inputs.push(path);
        }
    }
    inputs.sort();

    let mut readers = Vec::new();
    for path in &inputs {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        readers.push((path.display().to_string(), file));
    }

    let mut merged = scores::merge_tables(readers)
        .with_context(|| format!("merging tables under {}", cli.tables.display()))?;

    let score_file = File::open(&cli.scores)
        .with_context(|| format!("opening {}", cli.scores.display()))?;
    let score_name = cli.scores.display().to_string();
    let lookup = scores::read_score_table(score_file, &score_name)?;
    scores::attach_scores(&mut merged, &lookup);

    if let Some(parent) = cli.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let output = File::create(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    scores::write_table(&merged, output)?;

    println!(
        "Merged {} tables ({} rows) into {}",
        inputs.len(),
        merged.rows.len(),
        cli.output.display()
    );
    Ok(())
}
