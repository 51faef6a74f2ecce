//! Batch grading over a set of image files.
//!
//! Every page is read independently and produces exactly one
//! [`PageResult`], failures included, so a report always has one row per
//! input. With the `parallel` feature pages are spread over the rayon pool;
//! results keep the input order either way.
use crate::diagnostics::DetailedPageResult;
use crate::error::GradeError;
use crate::marks::MarkStatus;
use crate::orientation::FiducialLocator;
use crate::reader::{GradeReader, PageResult};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// File extensions picked up when an input is a directory.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Expand `inputs` into image paths.
///
/// Directories contribute their image files (not recursively) in name
/// order; anything else is passed through unchanged so a missing file still
/// shows up as an `image_not_found` row.
pub fn collect_image_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, GradeError> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)
                .map_err(|e| GradeError::io(input, e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && has_image_extension(p))
                .collect();
            found.sort();
            info!("collect_image_paths {}: {} images", input.display(), found.len());
            out.extend(found);
        } else {
            out.push(input.clone());
        }
    }
    Ok(out)
}

/// Grade every path.
pub fn grade_paths<L>(reader: &GradeReader<L>, paths: &[PathBuf]) -> Vec<PageResult>
where
    L: FiducialLocator + Sync,
{
    map_pages(paths, |path| reader.process_path(path))
}

/// Grade every path and hand each page's full trace to `sink` before it is
/// dropped. A failing sink is logged and does not stop the batch.
pub fn grade_paths_with<L, F>(reader: &GradeReader<L>, paths: &[PathBuf], sink: F) -> Vec<PageResult>
where
    L: FiducialLocator + Sync,
    F: Fn(&Path, &DetailedPageResult) -> Result<(), GradeError> + Sync,
{
    map_pages(paths, |path| {
        let detailed = reader.process_path_with_diagnostics(path);
        if let Err(err) = sink(path, &detailed) {
            warn!("grade_paths_with {}: {err}", path.display());
        }
        detailed.result
    })
}

fn map_pages<F>(paths: &[PathBuf], f: F) -> Vec<PageResult>
where
    F: Fn(&Path) -> PageResult + Sync,
{
    #[cfg(feature = "parallel")]
    {
        paths.par_iter().map(|p| f(p)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        paths.iter().map(|p| f(p)).collect()
    }
}

/// Counts over a finished batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub graded: usize,
    pub invalid_grid: usize,
    /// Pages with an error tag.
    pub failed: usize,
    /// Pages that had both a detected grade and a ground truth.
    pub compared: usize,
    pub correct: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[PageResult]) -> Self {
        let mut s = BatchSummary {
            total: results.len(),
            ..Default::default()
        };
        for r in results {
            if r.is_graded() {
                s.graded += 1;
            }
            if r.error.is_some() {
                s.failed += 1;
            }
            if r.status_int == MarkStatus::InvalidGrid {
                s.invalid_grid += 1;
            }
            if let Some(ok) = r.correct {
                s.compared += 1;
                if ok {
                    s.correct += 1;
                }
            }
        }
        s
    }

    /// Fraction of compared pages that were correct.
    pub fn accuracy(&self) -> Option<f64> {
        (self.compared > 0).then(|| self.correct as f64 / self.compared as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::PageError;

    #[test]
    fn directories_expand_to_sorted_images() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.JPG", "notes.txt", "c.jpeg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        let missing = PathBuf::from("/nonexistent/page.png");
        let paths = collect_image_paths(&[dir.path().to_path_buf(), missing.clone()]).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.jpeg", "page.png"]);
        assert_eq!(paths[3], missing);
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut graded = PageResult::new("a.png");
        graded.valid_grid = true;
        graded.note_detected = Some(10.0);
        let graded_ok = graded.clone().with_ground_truth(Some(10.0));
        let graded_bad = graded.with_ground_truth(Some(11.0));
        let mut invalid = PageResult::new("b.png");
        invalid.status_int = MarkStatus::InvalidGrid;
        invalid.status_dec = MarkStatus::InvalidGrid;
        let missing = PageResult {
            error: Some(PageError::ImageNotFound),
            ..PageResult::new("c.png")
        };

        let s = BatchSummary::from_results(&[graded_ok, graded_bad, invalid, missing]);
        assert_eq!(s.total, 4);
        assert_eq!(s.graded, 2);
        assert_eq!(s.invalid_grid, 1);
        assert_eq!(s.failed, 1);
        assert_eq!(s.compared, 2);
        assert_eq!(s.accuracy(), Some(0.5));
        assert_eq!(BatchSummary::default().accuracy(), None);
    }
}
