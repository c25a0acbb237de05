use std::io::{BufRead, Write};

use anyhow::Result;
use log::warn;

/// Line totals from one conversion run.
#[derive(Default)]
pub struct ConvertStats {
    pub converted: u64,
    pub skipped: u64,
}

/// Parses one Kraken 2 seqid2taxid-style line into a (seqid, taxid)
/// pair. Accepts both the three-column `<seqid> taxid <id>` form and
/// the bare two-column `<seqid> <id>` form, with or without a leading
/// FASTA-style `>`.
pub fn parse_map_line(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_prefix('>').unwrap_or(line).trim();
    let fields: Vec<&str> = line.split_whitespace().collect();

    match fields.as_slice() {
        [seqid, tag, taxid] if tag.eq_ignore_ascii_case("taxid") => Some((*seqid, *taxid)),
        [seqid, taxid] => Some((*seqid, *taxid)),
        _ => None,
    }
}

/// Converts a Kraken 2 map into the two-column conversion table
/// Centrifuge expects. Blank lines are ignored; lines in neither
/// recognized form are skipped with a warning.
pub fn convert_map<R: BufRead, W: Write>(reader: R, out: &mut W) -> Result<ConvertStats> {
    let mut stats = ConvertStats::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_map_line(line) {
            Some((seqid, taxid)) => {
                writeln!(out, "{}\t{}", seqid, taxid)?;
                stats.converted += 1;
            }
            None => {
                warn!("Unrecognized line format, skipping: {}", line);
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}
