use std::fs::{self, File};
use std::io::{self, Write};
use std::process::exit;

use anyhow::{Context, Result};
use memmap2::Mmap;

use k2utils::db_inspect::{self, DEFAULT_HASH_SAMPLE_BYTES};
use k2utils::utilities::{hex_dump_rows, hex_string};

// Command-line options; defaults point at the conventional database
// artifact names so a bare invocation inside a database directory works.
struct Options {
    options_filename: String,
    taxonomy_filename: String,
    hashtable_filename: String,
    sample_bytes: usize,
    verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            options_filename: "opts.k2d".to_string(),
            taxonomy_filename: "taxo.k2d".to_string(),
            hashtable_filename: "hash.k2d".to_string(),
            sample_bytes: DEFAULT_HASH_SAMPLE_BYTES,
            verbose: false,
        }
    }
}

// Parse command-line arguments
fn parse_command_line(args: &[String], opts: &mut Options) -> Result<()> {
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "-?" => {
                usage(0);
            }
            "-o" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("missing argument for -o");
                    usage(1);
                }
                opts.options_filename = args[i].clone();
            }
            "-t" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("missing argument for -t");
                    usage(1);
                }
                opts.taxonomy_filename = args[i].clone();
            }
            "-H" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("missing argument for -H");
                    usage(1);
                }
                opts.hashtable_filename = args[i].clone();
            }
            "-S" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("missing argument for -S");
                    usage(1);
                }
                opts.sample_bytes = args[i].parse().unwrap_or(DEFAULT_HASH_SAMPLE_BYTES);
            }
            "-v" => {
                opts.verbose = true;
            }
            _ => {
                eprintln!("unknown option: {}", args[i]);
                usage(1);
            }
        }
        i += 1;
    }

    Ok(())
}

// Print usage information
fn usage(exit_code: i32) -> ! {
    eprintln!(
        "Usage: inspect_db <options>\n\n\
        Options:\n\
        -o FILENAME   Database options filename (def: opts.k2d)\n\
        -t FILENAME   Database taxonomy filename (def: taxo.k2d)\n\
        -H FILENAME   Database hash table filename (def: hash.k2d)\n\
        -S INT        Bytes of the hash table to sample (def: 1 MiB)\n\
        -v            Verbose diagnostics on stderr"
    );
    exit(exit_code);
}

pub fn main() -> Result<()> {
    let mut opts = Options::default();

    let args: Vec<String> = std::env::args().collect();
    parse_command_line(&args, &mut opts)?;

    stderrlog::new()
        .module(module_path!())
        .module("k2utils")
        .verbosity(if opts.verbose { 2 } else { 1 })
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .context("Failed to initialize logging")?;

    // Options header report
    println!("Analyzing {}...", opts.options_filename);
    let data = fs::read(&opts.options_filename)
        .with_context(|| format!("Failed to read {}", opts.options_filename))?;
    log::info!("read {} bytes from {}", data.len(), opts.options_filename);
    let report = db_inspect::parse_options(&data)
        .with_context(|| format!("Failed to decode {}", opts.options_filename))?;

    println!("K-mer length: {}", report.kmer_len);
    println!("Minimizer length: {}", report.minimizer_len);
    println!("Total file size: {} bytes", report.file_size);
    println!();
    println!("Raw hex dump:");
    for row in hex_dump_rows(&data) {
        println!("{}", row);
    }

    // Taxonomy candidate scan
    println!();
    println!("Analyzing {}...", opts.taxonomy_filename);
    let data = fs::read(&opts.taxonomy_filename)
        .with_context(|| format!("Failed to read {}", opts.taxonomy_filename))?;
    log::info!("read {} bytes from {}", data.len(), opts.taxonomy_filename);
    let scan = db_inspect::scan_taxonomy(&data);

    println!();
    println!("Found {} potential taxonomy IDs", scan.candidate_ids.len());
    println!(
        "Found {} potential parent-child relationships",
        scan.parent_children.len()
    );
    println!();
    println!("Sample taxonomy IDs:");
    for tax_id in scan.candidate_ids.iter().take(10) {
        println!("{}", tax_id);
    }

    // Hash table byte-pattern census
    println!();
    println!("Peeking into {}...", opts.hashtable_filename);
    let file = File::open(&opts.hashtable_filename)
        .with_context(|| format!("Failed to open {}", opts.hashtable_filename))?;
    let file_len = file
        .metadata()
        .with_context(|| format!("Failed to stat {}", opts.hashtable_filename))?
        .len();
    // An empty file cannot be mapped; sample an empty slice instead.
    let sample = if file_len == 0 {
        db_inspect::sample_hash(&[], opts.sample_bytes)
    } else {
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to mmap {}", opts.hashtable_filename))?;
        db_inspect::sample_hash(&mmap, opts.sample_bytes)
    };

    println!();
    println!(
        "Analyzed first {:.2}MB of {}",
        sample.sample_mib(),
        opts.hashtable_filename
    );
    println!(
        "Found {} potential taxonomy markers",
        sample.candidate_markers.len()
    );
    println!();
    println!("Most common 8-byte patterns:");
    for (pattern, count) in sample.top_patterns(5) {
        println!("Pattern: {} Count: {}", hex_string(&pattern), count);
    }

    io::stdout().flush().context("Failed to flush stdout")?;
    Ok(())
}
