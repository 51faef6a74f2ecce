//! Per-page output records.
use crate::marks::{is_authoritative, MarkStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when comparing a detected grade with ground truth.
pub const GRADE_EPS: f64 = 1e-6;

/// Why a page carries no grade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageError {
    /// Missing or undecodable file.
    ImageNotFound,
    EmptyRoi,
    ImageTooLarge,
    /// At least one section has no trustworthy index.
    NoReliableNote,
    /// A trusted index falls outside its value table.
    IndexOutOfRange,
}

impl PageError {
    pub fn as_str(self) -> &'static str {
        match self {
            PageError::ImageNotFound => "image_not_found",
            PageError::EmptyRoi => "empty_roi",
            PageError::ImageTooLarge => "image_too_large",
            PageError::NoReliableNote => "no_reliable_note",
            PageError::IndexOutOfRange => "index_out_of_range",
        }
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One row of the grading report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub filename: String,
    pub valid_grid: bool,
    pub status_int: MarkStatus,
    pub status_dec: MarkStatus,
    /// Chosen integer box, kept even when no grade could be composed.
    pub idx_int: Option<usize>,
    /// Chosen fractional box, kept even when no grade could be composed.
    pub idx_dec: Option<usize>,
    pub note_detected: Option<f64>,
    pub error: Option<PageError>,
    /// Filled in from a ground-truth table, never by the pipeline.
    pub note_ground_truth: Option<f64>,
    pub correct: Option<bool>,
}

impl PageResult {
    /// Fresh record for `filename` with nothing processed yet.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            valid_grid: false,
            status_int: MarkStatus::NotProcessed,
            status_dec: MarkStatus::NotProcessed,
            idx_int: None,
            idx_dec: None,
            note_detected: None,
            error: None,
            note_ground_truth: None,
            correct: None,
        }
    }

    pub(crate) fn failed(filename: impl Into<String>, error: PageError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(filename)
        }
    }

    /// Record the expected grade; `correct` is only set when a grade was
    /// detected.
    pub fn with_ground_truth(mut self, truth: Option<f64>) -> Self {
        self.note_ground_truth = truth;
        self.correct = match (self.note_detected, truth) {
            (Some(d), Some(t)) => Some((d - t).abs() < GRADE_EPS),
            _ => None,
        };
        self
    }

    pub fn is_graded(&self) -> bool {
        self.note_detected.is_some()
    }
}

/// Combine the two section indices into a decimal grade.
///
/// `integer_cells` is the number of integer cells actually found on the page
/// and bounds the integer index; `fractional_values` maps the fractional
/// index to its value.
pub fn compose_grade(
    idx_int: Option<usize>,
    status_int: MarkStatus,
    idx_dec: Option<usize>,
    status_dec: MarkStatus,
    integer_cells: usize,
    fractional_values: &[f64],
) -> Result<f64, PageError> {
    if !is_authoritative(idx_int, status_int) || !is_authoritative(idx_dec, status_dec) {
        return Err(PageError::NoReliableNote);
    }
    match (idx_int, idx_dec) {
        (Some(i), Some(d)) if i < integer_cells => fractional_values
            .get(d)
            .map(|v| i as f64 + v)
            .ok_or(PageError::IndexOutOfRange),
        (Some(_), Some(_)) => Err(PageError::IndexOutOfRange),
        _ => Err(PageError::NoReliableNote),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MarkStatus::*;

    const QUARTERS: [f64; 4] = [0.0, 0.25, 0.5, 0.75];

    #[test]
    fn composes_integer_and_fraction() {
        let g = compose_grade(Some(14), SingleCandidate, Some(2), SingleCandidate, 21, &QUARTERS);
        assert_eq!(g, Ok(14.5));
        let g = compose_grade(
            Some(0),
            TwoCandidatesResolved,
            Some(3),
            SingleCandidate,
            21,
            &QUARTERS,
        );
        assert_eq!(g, Ok(0.75));
    }

    #[test]
    fn untrusted_sections_give_no_grade() {
        let g = compose_grade(Some(14), AmbiguousTwo, Some(2), SingleCandidate, 21, &QUARTERS);
        assert_eq!(g, Err(PageError::NoReliableNote));
        let g = compose_grade(Some(14), SingleCandidate, None, NoMark, 21, &QUARTERS);
        assert_eq!(g, Err(PageError::NoReliableNote));
    }

    #[test]
    fn out_of_range_indices_are_reported() {
        let g = compose_grade(Some(21), SingleCandidate, Some(0), SingleCandidate, 21, &QUARTERS);
        assert_eq!(g, Err(PageError::IndexOutOfRange));
        let g = compose_grade(Some(3), SingleCandidate, Some(4), SingleCandidate, 21, &QUARTERS);
        assert_eq!(g, Err(PageError::IndexOutOfRange));
    }

    #[test]
    fn ground_truth_sets_correctness() {
        let mut r = PageResult::new("a.png");
        r.note_detected = Some(12.25);
        let r = r.with_ground_truth(Some(12.25));
        assert_eq!(r.correct, Some(true));
        let r = r.with_ground_truth(Some(12.5));
        assert_eq!(r.correct, Some(false));
        let r = PageResult::new("b.png").with_ground_truth(Some(3.0));
        assert_eq!(r.note_ground_truth, Some(3.0));
        assert_eq!(r.correct, None);
    }

    #[test]
    fn serializes_tags_in_snake_case() {
        let r = PageResult::failed("c.png", PageError::EmptyRoi);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status_int"], "not_processed");
        assert_eq!(v["error"], "empty_roi");
        assert!(v["note_detected"].is_null());
    }
}
