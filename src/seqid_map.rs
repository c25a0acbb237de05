use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use log::error;

/// Resolves a sequence accession to an NCBI taxonomy ID string.
pub trait TaxidLookup {
    fn lookup(&self, accession: &str) -> Result<String>;
}

/// Resolves accessions through the NCBI Entrez Direct tools: the
/// output of `esearch -db taxonomy -query <accession>[ACCN]` is piped
/// into `xtract -pattern Id -element Id`, whose trimmed stdout is the
/// TaxID. Both tools must be on PATH.
pub struct EntrezLookup;

impl TaxidLookup for EntrezLookup {
    fn lookup(&self, accession: &str) -> Result<String> {
        let query = format!("{}[ACCN]", accession);
        let mut esearch = Command::new("esearch")
            .args(["-db", "taxonomy", "-query", &query])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to run esearch")?;
        let esearch_out = esearch
            .stdout
            .take()
            .context("Failed to capture esearch output")?;

        let xtract = Command::new("xtract")
            .args(["-pattern", "Id", "-element", "Id"])
            .stdin(Stdio::from(esearch_out))
            .stderr(Stdio::null())
            .output()
            .context("Failed to run xtract")?;

        let esearch_status = esearch.wait().context("Failed to wait on esearch")?;
        if !esearch_status.success() {
            bail!("esearch failed for {}: {}", accession, esearch_status);
        }
        if !xtract.status.success() {
            bail!("xtract failed for {}: {}", accession, xtract.status);
        }

        Ok(String::from_utf8_lossy(&xtract.stdout).trim().to_string())
    }
}

/// Opens a FASTA file for buffered line reading, decompressing through
/// a gzip stream when the path carries a `.gz` suffix.
pub fn open_fasta(path: &Path) -> Result<Box<dyn BufRead>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Running totals for one mapping run.
#[derive(Default, Clone, Copy)]
pub struct MapStats {
    pub headers: u64,
    pub failed: u64,
}

/// Walks FASTA headers and writes a two-column `<seqid>\t<taxid>` map
/// in input order. The sequence ID is the header text up to the first
/// whitespace. A lookup that fails or answers with an empty string maps
/// the ID to taxid 0; lookup failures are logged, never fatal. The
/// progress callback fires after every written line.
pub fn write_seqid2taxid_map<R, W, L>(
    reader: R,
    out: &mut W,
    lookup: &L,
    mut progress: impl FnMut(MapStats),
) -> Result<MapStats>
where
    R: BufRead,
    W: Write,
    L: TaxidLookup + ?Sized,
{
    let mut stats = MapStats::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        let Some(header) = line.strip_prefix('>') else {
            continue;
        };
        let Some(seq_id) = header.split_whitespace().next() else {
            continue;
        };
        stats.headers += 1;

        let taxid = match lookup.lookup(seq_id) {
            Ok(taxid) if !taxid.is_empty() => taxid,
            Ok(_) => "0".to_string(),
            Err(err) => {
                error!("Taxid lookup failed for {}: {:#}", seq_id, err);
                stats.failed += 1;
                "0".to_string()
            }
        };

        writeln!(out, "{}\t{}", seq_id, taxid)?;
        progress(stats);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct StubLookup {
        taxids: HashMap<String, String>,
    }

    impl TaxidLookup for StubLookup {
        fn lookup(&self, accession: &str) -> Result<String> {
            match self.taxids.get(accession) {
                Some(taxid) => Ok(taxid.clone()),
                None => bail!("no such accession"),
            }
        }
    }

    fn stub(pairs: &[(&str, &str)]) -> StubLookup {
        StubLookup {
            taxids: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_map_preserves_header_order() {
        let fasta = "\
>NC_000001.1 Homo sapiens chromosome 1
ACGTACGT
>NC_000002.1
ACGT
";
        let lookup = stub(&[("NC_000001.1", "9606"), ("NC_000002.1", "9606")]);
        let mut out = Vec::new();
        let stats =
            write_seqid2taxid_map(fasta.as_bytes(), &mut out, &lookup, |_| {}).unwrap();

        assert_eq!(stats.headers, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "NC_000001.1\t9606\nNC_000002.1\t9606\n"
        );
    }

    #[test]
    fn test_failed_lookup_maps_to_zero() {
        let fasta = ">NC_404.1 not in the stub\nACGT\n";
        let lookup = stub(&[]);
        let mut out = Vec::new();
        let stats =
            write_seqid2taxid_map(fasta.as_bytes(), &mut out, &lookup, |_| {}).unwrap();

        assert_eq!(stats.headers, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(String::from_utf8(out).unwrap(), "NC_404.1\t0\n");
    }

    #[test]
    fn test_empty_answer_maps_to_zero() {
        let fasta = ">NC_000001.1\n";
        let lookup = stub(&[("NC_000001.1", "")]);
        let mut out = Vec::new();
        write_seqid2taxid_map(fasta.as_bytes(), &mut out, &lookup, |_| {}).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "NC_000001.1\t0\n");
    }

    #[test]
    fn test_sequence_lines_are_ignored() {
        let fasta = "ACGT\n\n>NC_000001.1\nACGT\nACGT\n";
        let lookup = stub(&[("NC_000001.1", "9606")]);
        let mut out = Vec::new();
        let stats =
            write_seqid2taxid_map(fasta.as_bytes(), &mut out, &lookup, |_| {}).unwrap();
        assert_eq!(stats.headers, 1);
    }

    #[test]
    fn test_progress_fires_per_header() {
        let fasta = ">a\n>b\n>c\n";
        let lookup = stub(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let mut out = Vec::new();
        let mut calls = 0;
        write_seqid2taxid_map(fasta.as_bytes(), &mut out, &lookup, |stats| {
            calls += 1;
            assert_eq!(stats.headers, calls);
        })
        .unwrap();
        assert_eq!(calls, 3);
    }
}
