use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use variant_cohorts::scores;

/// Extracts prioritisation scores and coding-change notations from an
/// annotator's tab-separated export into a `Gene,Nucleotide,VIPR_Pathogenicity`
/// table consumable by join-scores.
#[derive(Parser, Debug)]
#[command(name = "extract-scores")]
#[command(about = "Extract pathogenicity scores from an annotator export")]
struct Cli {
    /// Tab-separated annotator export (prioritised variants).
    #[arg(long)]
    input: PathBuf,

    /// Output CSV path.
    #[arg(long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let input = File::open(&cli.input)
        .with_context(|| format!("opening {}", cli.input.display()))?;
    let table_name = cli.input.display().to_string();
    let rows = scores::extract_scores(input, &table_name)
        .with_context(|| format!("extracting scores from {}", table_name))?;

    if let Some(parent) = cli.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let output = File::create(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    scores::write_scores(&rows, output)?;

    println!(
        "Extracted {} score rows to {}",
        rows.len(),
        cli.output.display()
    );
    Ok(())
}
