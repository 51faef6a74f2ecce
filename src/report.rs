//! Report export and ground-truth comparison.
//!
//! - `write_json_report`: pretty JSON array of [`PageResult`]s.
//! - `write_csv_report`: one header row plus one row per page; absent values
//!   are empty cells, grades carry two decimals.
//! - `load_ground_truth`: JSON object mapping file names to expected grades.
use crate::error::GradeError;
use crate::image::io::{ensure_parent_dir, write_json_file};
use crate::reader::PageResult;
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;

/// Column order of the CSV report.
pub const CSV_HEADER: [&str; 10] = [
    "filename",
    "valid_grid",
    "status_int",
    "status_dec",
    "idx_int",
    "idx_dec",
    "note_detected",
    "error",
    "note_ground_truth",
    "correct",
];

pub fn write_json_report(path: &Path, results: &[PageResult]) -> Result<(), GradeError> {
    write_json_file(path, &results)
}

pub fn write_csv_report(path: &Path, results: &[PageResult]) -> Result<(), GradeError> {
    ensure_parent_dir(path)?;
    fs::write(path, csv_string(results)).map_err(|e| GradeError::io(path, e))
}

/// Render `results` as CSV text.
pub fn csv_string(results: &[PageResult]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for r in results {
        let fields = [
            csv_field(&r.filename),
            r.valid_grid.to_string(),
            r.status_int.to_string(),
            r.status_dec.to_string(),
            opt(r.idx_int),
            opt(r.idx_dec),
            grade(r.note_detected),
            opt(r.error),
            grade(r.note_ground_truth),
            opt(r.correct),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn opt<T: Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn grade(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_default()
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Expected grades keyed by file name.
pub fn load_ground_truth(path: &Path) -> Result<HashMap<String, f64>, GradeError> {
    let contents = fs::read_to_string(path).map_err(|e| GradeError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| GradeError::json(path, e))
}

/// Attach ground truth to each result by file name.
pub fn apply_ground_truth(results: Vec<PageResult>, truth: &HashMap<String, f64>) -> Vec<PageResult> {
    results
        .into_iter()
        .map(|r| {
            let t = truth.get(&r.filename).copied();
            r.with_ground_truth(t)
        })
        .collect()
}
