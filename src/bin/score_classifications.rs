use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use k2utils::scoring::{self, RESULTS_HEADER};

#[derive(Parser)]
#[command(version)]
#[command(about = "Score classification reports against a ground-truth reference set")]
struct Cli {
    // Directory holding per-sample classification reports (*.txt)
    #[arg(long = "dir", required = true)]
    dir: PathBuf,

    // Ground-truth file, one reference accession per line
    #[arg(long = "truth", required = true)]
    truth: PathBuf,

    // Summary CSV, appended to across runs
    #[arg(short = 'o', long = "output", default_value = "results_summary.csv")]
    output: PathBuf,

    // Verbosity
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,
}

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
        .module(module_path!())
        .module("k2utils")
        .verbosity(log_max_level)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_log(if cli.verbose { 2 } else { 1 });

    let ground_truth = scoring::load_ground_truth(&cli.truth)?;
    log::info!("loaded {} ground-truth references", ground_truth.len());

    // Sorted report list so reruns append rows in a stable order.
    let mut report_paths = Vec::new();
    for entry in std::fs::read_dir(&cli.dir)
        .with_context(|| format!("Failed to read directory {}", cli.dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "txt") {
            report_paths.push(path);
        }
    }
    report_paths.sort();

    let write_header = !cli.output.exists();
    let out_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.output)
        .with_context(|| format!("Failed to open {}", cli.output.display()))?;
    let mut out = BufWriter::new(out_file);

    if write_header {
        writeln!(out, "{}", RESULTS_HEADER)?;
    }

    for path in &report_paths {
        let row = scoring::score_file(path, &ground_truth)?;
        writeln!(out, "{}", row.to_csv())?;
    }
    out.flush().context("Failed to flush results")?;

    eprintln!(
        "Scored {} report files into {}",
        report_paths.len(),
        cli.output.display()
    );

    Ok(())
}
