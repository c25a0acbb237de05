use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use k2utils::scoring;

fn write_report_fixtures(dir: &Path) -> PathBuf {
    let reports = dir.join("reports");
    fs::create_dir(&reports).unwrap();
    // depth1 -> identity threshold 10.0
    fs::write(
        reports.join("sim_depth1_read20_deam0.3_s_falcon.txt"),
        "1\t120\t85.0\tNC_013511.1 Mycoplasma pneumoniae\n\
         2\t80\t50.0\tNC_007605.1 not in ground truth\n\
         3\t10\t5.0\tNC_001139.9 below threshold\n",
    )
    .unwrap();
    fs::write(reports.join("notes.log"), "not a report\n").unwrap();
    reports
}

fn write_truth(dir: &Path) -> PathBuf {
    let path = dir.join("ground_truth.list");
    fs::write(&path, "# simulated genomes\nNC_013511.1\nNC_000883.2\n\n").unwrap();
    path
}

#[test]
fn test_score_file_against_ground_truth() {
    let dir = tempfile::tempdir().unwrap();
    let reports = write_report_fixtures(dir.path());
    let truth = scoring::load_ground_truth(&write_truth(dir.path())).unwrap();
    assert_eq!(truth.len(), 2);

    let row = scoring::score_file(
        &reports.join("sim_depth1_read20_deam0.3_s_falcon.txt"),
        &truth,
    )
    .unwrap();

    assert_eq!(row.depth, Some(1));
    assert_eq!(row.matrix.true_positives, 1);
    assert_eq!(row.matrix.false_positives, 1);
    assert_eq!(row.matrix.false_negatives, 1);
    assert_eq!(row.matrix.true_negatives, 1);
    assert_eq!(
        row.to_csv(),
        "sim_depth1_read20_deam0.3_s_falcon.txt,1,1,1,1,1,0.500,0.500,0.500"
    );
}

#[test]
fn test_binary_appends_csv_with_header_once() {
    let dir = tempfile::tempdir().unwrap();
    let reports = write_report_fixtures(dir.path());
    let truth_path = write_truth(dir.path());
    let out_path = dir.path().join("results_summary.csv");

    for _ in 0..2 {
        let status = Command::new(env!("CARGO_BIN_EXE_score_classifications"))
            .arg("--dir")
            .arg(&reports)
            .arg("--truth")
            .arg(&truth_path)
            .arg("--output")
            .arg(&out_path)
            .status()
            .unwrap();
        assert!(status.success());
    }

    let csv = fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    // One header plus one row per run; only .txt files are scored.
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Filename,Depth,TP,FP,FN,TN,Precision,Recall,F1");
    assert_eq!(lines[1], lines[2]);
    assert!(lines[1].starts_with("sim_depth1_read20_deam0.3_s_falcon.txt,1,"));
}
