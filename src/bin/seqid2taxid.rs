use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use k2utils::seqid_map::{self, EntrezLookup};

#[derive(Parser)]
#[command(version)]
#[command(about = "Map FASTA sequence IDs to NCBI taxonomy IDs via Entrez Direct")]
struct Cli {
    // Input FASTA file; gzipped input is detected by a .gz suffix
    #[arg(help = "Input FASTA file")]
    input_fasta: PathBuf,

    // Two-column seqid<TAB>taxid output
    #[arg(help = "Output map file")]
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

    let reader = seqid_map::open_fasta(&cli.input_fasta)?;
    let out_file = File::create(&cli.output_map)
        .with_context(|| format!("Failed to create {}", cli.output_map.display()))?;
    let mut out = BufWriter::new(out_file);

    let show_progress = atty::is(atty::Stream::Stderr);
    let stats = seqid_map::write_seqid2taxid_map(reader, &mut out, &EntrezLookup, |stats| {
        if show_progress {
            eprint!(
                "\rMapped {} sequence IDs, {} lookups failed...",
                stats.headers, stats.failed
            );
        }
    })?;
    out.flush().context("Failed to flush output map")?;

    if show_progress {
        eprint!("\r");
    }
    eprintln!(
        "Mapped {} sequence IDs, {} lookups failed, mapping complete.",
        stats.headers, stats.failed
    );

    Ok(())
}
