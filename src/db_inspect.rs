use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};
use byteorder::{ByteOrder, NativeEndian};

/// Minimum number of bytes an options file must hold: two u64 fields.
pub const OPTIONS_HEADER_SIZE: usize = 16;

/// Upper bound (exclusive) of the plausible taxonomy ID range.
pub const TAXID_PLAUSIBLE_MAX: u64 = 2_000_000;

/// Default number of bytes sampled from the front of the hash table.
pub const DEFAULT_HASH_SAMPLE_BYTES: usize = 1024 * 1024;

/// Heuristic plausibility filter for raw u64 values read out of an
/// undocumented byte stream. Both bounds are exclusive.
pub fn plausible_taxid(value: u64) -> bool {
    value > 0 && value < TAXID_PLAUSIBLE_MAX
}

/// Decoded fields of an options file header.
pub struct OptionsReport {
    pub kmer_len: u64,
    pub minimizer_len: u64,
    pub file_size: usize,
}

/// Decodes the fixed options header: bytes [0,8) hold the k-mer length
/// and bytes [8,16) the minimizer length, both native-endian u64.
///
/// Fails if the buffer cannot hold the full header; a truncated header
/// is not interpretable.
pub fn parse_options(data: &[u8]) -> Result<OptionsReport> {
    if data.len() < OPTIONS_HEADER_SIZE {
        bail!(
            "options buffer too small: {} bytes, need at least {}",
            data.len(),
            OPTIONS_HEADER_SIZE
        );
    }
    Ok(OptionsReport {
        kmer_len: NativeEndian::read_u64(&data[0..8]),
        minimizer_len: NativeEndian::read_u64(&data[8..16]),
        file_size: data.len(),
    })
}

/// Candidate taxonomy IDs and parent-child relations recovered from a
/// taxonomy file scan.
pub struct TaxonomyScan {
    pub candidate_ids: HashSet<u64>,
    pub parent_children: HashMap<u64, Vec<u64>>,
}

/// Scans a taxonomy file image for plausible taxonomy IDs.
///
/// Slides an 8-byte-aligned window with stride 8 over offsets in
/// [0, len - 8). A value passing the plausibility filter is recorded as
/// a candidate ID; when 16 bytes remain at the offset and the following
/// u64 also passes the filter, it is recorded as that candidate's
/// parent. The 16-byte child/parent stride is a diagnostic heuristic,
/// never validated against an authoritative taxonomy.
pub fn scan_taxonomy(data: &[u8]) -> TaxonomyScan {
    let mut candidate_ids = HashSet::new();
    let mut parent_children: HashMap<u64, Vec<u64>> = HashMap::new();

    let end = data.len().saturating_sub(8);
    let mut offset = 0;
    while offset < end {
        let tax_id = NativeEndian::read_u64(&data[offset..offset + 8]);
        if plausible_taxid(tax_id) {
            candidate_ids.insert(tax_id);

            if offset + 16 <= data.len() {
                let possible_parent = NativeEndian::read_u64(&data[offset + 8..offset + 16]);
                if plausible_taxid(possible_parent) {
                    parent_children.entry(possible_parent).or_default().push(tax_id);
                }
            }
        }
        offset += 8;
    }

    TaxonomyScan {
        candidate_ids,
        parent_children,
    }
}

/// Byte-pattern census over a bounded prefix of the hash table.
pub struct HashSample {
    /// Number of bytes actually analyzed (at most the requested window).
    pub sample_len: usize,
    pub candidate_markers: HashSet<u64>,
    pub pattern_counts: HashMap<[u8; 8], u64>,
}

impl HashSample {
    pub fn sample_mib(&self) -> f64 {
        self.sample_len as f64 / (1024.0 * 1024.0)
    }

    /// The `n` most frequent patterns with their counts, descending.
    /// Ties are broken arbitrarily.
    pub fn top_patterns(&self, n: usize) -> Vec<([u8; 8], u64)> {
        let mut patterns: Vec<([u8; 8], u64)> = self
            .pattern_counts
            .iter()
            .map(|(pattern, count)| (*pattern, *count))
            .collect();
        patterns.sort_by(|a, b| b.1.cmp(&a.1));
        patterns.truncate(n);
        patterns
    }
}

/// Censuses 8-byte patterns in the first `window` bytes of a hash table
/// image, sliding one byte at a time over offsets in [0, sample - 8).
/// Every window is histogrammed by exact content; windows that decode
/// into the plausible taxonomy ID range also join the marker set.
pub fn sample_hash(data: &[u8], window: usize) -> HashSample {
    let sample = &data[..data.len().min(window)];

    let mut candidate_markers = HashSet::new();
    let mut pattern_counts: HashMap<[u8; 8], u64> = HashMap::new();

    for i in 0..sample.len().saturating_sub(8) {
        let mut pattern = [0u8; 8];
        pattern.copy_from_slice(&sample[i..i + 8]);
        *pattern_counts.entry(pattern).or_insert(0) += 1;

        let value = NativeEndian::read_u64(&pattern);
        if plausible_taxid(value) {
            candidate_markers.insert(value);
        }
    }

    HashSample {
        sample_len: sample.len(),
        candidate_markers,
        pattern_counts,
    }
}
