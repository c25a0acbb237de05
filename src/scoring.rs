use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

lazy_static! {
    static ref ACCESSION_RE: Regex = Regex::new(r"^NC_\d+\.\d+").unwrap();
    static ref DEPTH_RE: Regex = Regex::new(r"depth(\d+)").unwrap();
}

/// CSV header written at the top of a fresh results file.
pub const RESULTS_HEADER: &str = "Filename,Depth,TP,FP,FN,TN,Precision,Recall,F1";

/// Extracts the leading RefSeq accession (`NC_` form) from a reference
/// string; reference strings in any other shape pass through unchanged.
pub fn extract_accession(ref_string: &str) -> &str {
    match ACCESSION_RE.find(ref_string) {
        Some(m) => m.as_str(),
        None => ref_string,
    }
}

/// Pulls the simulated coverage depth out of a report file name such as
/// `sim_depth1_read20_deam0.3_s_falcon.txt`.
pub fn depth_from_filename(filename: &str) -> Option<u32> {
    DEPTH_RE
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Identity threshold policy by simulated depth.
pub fn threshold_for_depth(depth: Option<u32>) -> f64 {
    match depth {
        None => 70.0,
        Some(d) if d < 5 => 10.0,
        Some(d) if d < 20 => 30.0,
        Some(_) => 90.0,
    }
}

#[derive(Default, Clone, Copy)]
pub struct ConfusionMatrix {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub true_negatives: u64,
}

impl ConfusionMatrix {
    pub fn precision(&self) -> f64 {
        let denom = self.true_positives + self.false_positives;
        if denom == 0 {
            0.0
        } else {
            self.true_positives as f64 / denom as f64
        }
    }

    pub fn recall(&self) -> f64 {
        let denom = self.true_positives + self.false_negatives;
        if denom == 0 {
            0.0
        } else {
            self.true_positives as f64 / denom as f64
        }
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

/// One scored report file, ready for CSV output.
pub struct ScoreRow {
    pub filename: String,
    pub depth: Option<u32>,
    pub matrix: ConfusionMatrix,
}

impl ScoreRow {
    pub fn to_csv(&self) -> String {
        let depth = match self.depth {
            Some(d) => d.to_string(),
            None => "NA".to_string(),
        };
        format!(
            "{},{},{},{},{},{},{:.3},{:.3},{:.3}",
            self.filename,
            depth,
            self.matrix.true_positives,
            self.matrix.false_positives,
            self.matrix.false_negatives,
            self.matrix.true_negatives,
            self.matrix.precision(),
            self.matrix.recall(),
            self.matrix.f1()
        )
    }
}

/// Tallies a confusion matrix over one classification report.
///
/// Report lines carry at least four tab-separated fields with a percent
/// identity in the third and a reference string in the fourth. Lines
/// that cannot be scored (too few fields, non-numeric identity) are
/// skipped. Ground-truth references never detected above threshold
/// count as false negatives.
pub fn evaluate_report<R: BufRead>(
    reader: R,
    ground_truth: &HashSet<String>,
    threshold: f64,
) -> Result<ConfusionMatrix> {
    let mut matrix = ConfusionMatrix::default();
    let mut detected_refs: HashSet<String> = HashSet::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            continue; // malformed or header line
        }
        let identity: f64 = match fields[2].parse() {
            Ok(v) => v,
            Err(_) => {
                warn!("Non-numeric identity field, skipping line: {}", line);
                continue;
            }
        };
        let ref_id = extract_accession(fields[3]);

        let predicted_positive = identity >= threshold;
        let truly_present = ground_truth.contains(ref_id);

        if predicted_positive && truly_present {
            matrix.true_positives += 1;
            detected_refs.insert(ref_id.to_string());
        } else if predicted_positive && !truly_present {
            matrix.false_positives += 1;
        } else if !predicted_positive && !truly_present {
            matrix.true_negatives += 1;
        }
        // Missed ground-truth references are tallied below.
    }

    matrix.false_negatives = ground_truth
        .iter()
        .filter(|gt_id| !detected_refs.contains(*gt_id))
        .count() as u64;

    Ok(matrix)
}

/// Scores a single report file, deriving the identity threshold from
/// the depth encoded in its file name.
pub fn score_file(path: &Path, ground_truth: &HashSet<String>) -> Result<ScoreRow> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let depth = depth_from_filename(&filename);
    let threshold = threshold_for_depth(depth);

    let file =
        File::open(path).with_context(|| format!("Failed to open report {}", path.display()))?;
    let matrix = evaluate_report(BufReader::new(file), ground_truth, threshold)?;

    Ok(ScoreRow {
        filename,
        depth,
        matrix,
    })
}

/// Loads a ground-truth reference set: one accession per line, blank
/// lines and `#` comments ignored.
pub fn load_ground_truth(path: &Path) -> Result<HashSet<String>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open ground truth {}", path.display()))?;
    let mut ground_truth = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        ground_truth.insert(line.to_string());
    }
    Ok(ground_truth)
}
