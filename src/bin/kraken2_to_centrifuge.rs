use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use k2utils::map_convert;

#[derive(Parser)]
#[command(version)]
#[command(about = "Convert a Kraken 2 seqid2taxid map into a Centrifuge conversion table")]
struct Cli {
    #[arg(help = "Input Kraken 2 map file")]
    input_map: PathBuf,

    #[arg(help = "Output Centrifuge conversion table")]
    output_map: PathBuf,

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

    let in_file = File::open(&cli.input_map)
        .with_context(|| format!("Failed to open {}", cli.input_map.display()))?;
    let out_file = File::create(&cli.output_map)
        .with_context(|| format!("Failed to create {}", cli.output_map.display()))?;
    let mut out = BufWriter::new(out_file);

    let stats = map_convert::convert_map(BufReader::new(in_file), &mut out)?;
    out.flush().context("Failed to flush conversion table")?;

    eprintln!(
        "Converted {} lines, skipped {} unrecognized lines.",
        stats.converted, stats.skipped
    );

    Ok(())
}
