//! Mark resolution for one section of checkbox cells.
//!
//! Each cell gets a fill-density score: the number of foreground pixels in
//! its bottom half after local mean thresholding. Printed labels sit in the
//! top half of the boxes and are left out. The scores are compared to a
//! baseline (by default their mean, the noise level of an unmarked cell) and
//! the resolver decides whether exactly one cell stands out.
//!
//! Resolution order
//! 1. No cells → [`MarkStatus::NoCells`].
//! 2. Largest excess over the baseline ≤ 0 → [`MarkStatus::NoMark`].
//! 3. Candidates are cells whose excess reaches `max_excess / divisor`.
//! 4. None → [`MarkStatus::NoCandidate`]; one → [`MarkStatus::SingleCandidate`].
//! 5. Up to `max_candidates`: the strongest wins unless the runner-up is
//!    within `min_margin` of it (relative to the best raw score), which gives
//!    [`MarkStatus::AmbiguousTwo`].
//! 6. More → [`MarkStatus::TooManyCandidates`].
//!
//! Anything but a single or resolved candidate means the section has no
//! trustworthy answer and must not be guessed.
use crate::binarize::adaptive_threshold_mean;
use crate::grid::Cell;
use crate::image::PageImage;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal classification of a section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkStatus {
    /// The page stopped before this section was looked at.
    NotProcessed,
    /// The lattice was rejected.
    InvalidGrid,
    NoCells,
    NoMark,
    NoCandidate,
    SingleCandidate,
    AmbiguousTwo,
    TwoCandidatesResolved,
    TooManyCandidates,
}

impl MarkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkStatus::NotProcessed => "not_processed",
            MarkStatus::InvalidGrid => "invalid_grid",
            MarkStatus::NoCells => "no_cells",
            MarkStatus::NoMark => "no_mark",
            MarkStatus::NoCandidate => "no_candidate",
            MarkStatus::SingleCandidate => "single_candidate",
            MarkStatus::AmbiguousTwo => "ambiguous_two",
            MarkStatus::TwoCandidatesResolved => "two_candidates_resolved",
            MarkStatus::TooManyCandidates => "too_many_candidates",
        }
    }

    /// Whether an index chosen under this status can be trusted.
    pub fn is_authoritative(self) -> bool {
        matches!(
            self,
            MarkStatus::SingleCandidate | MarkStatus::TwoCandidatesResolved
        )
    }
}

impl fmt::Display for MarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// `index` is usable only when present and backed by an authoritative status.
pub fn is_authoritative(index: Option<usize>, status: MarkStatus) -> bool {
    index.is_some() && status.is_authoritative()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkParams {
    /// Local mean window for scoring (odd).
    pub window: usize,
    /// Offset subtracted from the local mean for scoring.
    pub offset: i32,
    /// Candidate threshold is `max_excess / threshold_divisor`.
    pub threshold_divisor: f64,
    /// Largest candidate count still resolved by strength.
    pub max_candidates: usize,
    /// Minimum relative lead of the best candidate over the runner-up.
    pub min_margin: f64,
}

impl Default for MarkParams {
    fn default() -> Self {
        Self {
            window: 15,
            offset: 8,
            threshold_divisor: 1.8,
            max_candidates: 2,
            min_margin: 0.10,
        }
    }
}

/// Outcome for one section.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellAnalysis {
    pub scores: Vec<u32>,
    /// Reference the scores were compared against; `None` only without cells
    /// and without a supplied reference.
    pub baseline: Option<f64>,
    pub candidates: Vec<usize>,
    pub chosen: Option<usize>,
    pub status: MarkStatus,
}

impl CellAnalysis {
    /// The chosen index when it can be trusted.
    pub fn authoritative_index(&self) -> Option<usize> {
        self.chosen.filter(|_| self.status.is_authoritative())
    }
}

/// Foreground pixel count in the bottom half of `cell`.
pub fn score_cell(cell: &PageImage, params: &MarkParams) -> u32 {
    let h = cell.height();
    if h == 0 || cell.width() == 0 {
        return 0;
    }
    let bottom = cell.crop_rows(h / 2, h).to_gray();
    adaptive_threshold_mean(&bottom, params.window, params.offset).count_foreground() as u32
}

#[derive(Clone, Debug, Default)]
pub struct CellMarkAnalyzer {
    params: MarkParams,
}

impl CellMarkAnalyzer {
    pub fn new(params: MarkParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MarkParams {
        &self.params
    }

    /// Score `cells` and resolve the marked one.
    pub fn analyze(&self, cells: &[Cell], reference: Option<f64>) -> CellAnalysis {
        let scores: Vec<u32> = cells
            .iter()
            .map(|c| score_cell(&c.image, &self.params))
            .collect();
        self.resolve(&scores, reference)
    }

    /// Resolve the marked cell from precomputed scores.
    pub fn resolve(&self, scores: &[u32], reference: Option<f64>) -> CellAnalysis {
        let p = &self.params;
        let mut out = CellAnalysis {
            scores: scores.to_vec(),
            baseline: reference,
            candidates: Vec::new(),
            chosen: None,
            status: MarkStatus::NoCells,
        };
        if scores.is_empty() {
            return out;
        }

        let baseline = reference
            .unwrap_or_else(|| scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64);
        out.baseline = Some(baseline);

        let diffs: Vec<f64> = scores.iter().map(|&s| s as f64 - baseline).collect();
        let max_diff = diffs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max_diff <= 0.0 {
            out.status = MarkStatus::NoMark;
            return out;
        }

        let threshold = max_diff / p.threshold_divisor;
        out.candidates = diffs
            .iter()
            .enumerate()
            .filter_map(|(i, &d)| (d >= threshold).then_some(i))
            .collect();
        trace!(
            "CellMarkAnalyzer::resolve baseline={:.2} max_diff={:.2} threshold={:.2} candidates={:?}",
            baseline,
            max_diff,
            threshold,
            out.candidates
        );

        match out.candidates.len() {
            0 => out.status = MarkStatus::NoCandidate,
            1 => {
                out.status = MarkStatus::SingleCandidate;
                out.chosen = Some(out.candidates[0]);
            }
            n if n <= p.max_candidates => {
                let mut ranked = out.candidates.clone();
                // Stable: equal scores keep left-to-right order.
                ranked.sort_by(|&a, &b| scores[b].cmp(&scores[a]));
                let (best, second) = (ranked[0], ranked[1]);
                let best_score = scores[best] as f64;
                let margin = if best_score > 0.0 {
                    (best_score - scores[second] as f64) / best_score
                } else {
                    0.0
                };
                if margin < p.min_margin {
                    out.status = MarkStatus::AmbiguousTwo;
                } else {
                    out.status = MarkStatus::TwoCandidatesResolved;
                    out.chosen = Some(best);
                }
            }
            _ => out.status = MarkStatus::TooManyCandidates,
        }
        debug!(
            "CellMarkAnalyzer::resolve cells={} status={} chosen={:?}",
            scores.len(),
            out.status,
            out.chosen
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayImageU8;
    use crate::types::PixelRect;

    fn resolve(scores: &[u32]) -> CellAnalysis {
        CellMarkAnalyzer::default().resolve(scores, None)
    }

    #[test]
    fn single_candidate_is_chosen() {
        let a = resolve(&[5, 5, 40, 5]);
        assert_eq!(a.status, MarkStatus::SingleCandidate);
        assert_eq!(a.chosen, Some(2));
        assert_eq!(a.candidates, vec![2]);
        assert!((a.baseline.unwrap() - 13.75).abs() < 1e-9);
        assert_eq!(a.authoritative_index(), Some(2));
    }

    #[test]
    fn close_pair_is_ambiguous() {
        let a = resolve(&[5, 38, 40, 5]);
        assert_eq!(a.candidates, vec![1, 2]);
        assert_eq!(a.status, MarkStatus::AmbiguousTwo);
        assert_eq!(a.chosen, None);
        assert_eq!(a.authoritative_index(), None);
    }

    #[test]
    fn clear_winner_of_two_is_resolved() {
        // With the default divisor only the 60 would pass (threshold 17.4).
        let analyzer = CellMarkAnalyzer::new(MarkParams {
            threshold_divisor: 3.0,
            ..Default::default()
        });
        let a = analyzer.resolve(&[5, 40, 60, 10], None);
        assert_eq!(a.candidates, vec![1, 2]);
        assert_eq!(a.status, MarkStatus::TwoCandidatesResolved);
        assert_eq!(a.chosen, Some(2));
    }

    #[test]
    fn uniform_scores_have_no_mark() {
        let a = resolve(&[12, 12, 12]);
        assert_eq!(a.status, MarkStatus::NoMark);
        assert_eq!(a.chosen, None);
    }

    #[test]
    fn many_strong_cells_are_noise() {
        let a = resolve(&[50, 50, 50, 0, 0, 0]);
        assert_eq!(a.candidates, vec![0, 1, 2]);
        assert_eq!(a.status, MarkStatus::TooManyCandidates);
    }

    #[test]
    fn supplied_reference_replaces_the_mean() {
        // A reference above every score: nothing exceeds it.
        let a = CellMarkAnalyzer::default().resolve(&[5, 6, 7], Some(10.0));
        assert_eq!(a.status, MarkStatus::NoMark);
        assert_eq!(a.baseline, Some(10.0));
        // A low reference lifts every cell over the threshold.
        let a = CellMarkAnalyzer::default().resolve(&[40, 41, 42], Some(0.0));
        assert_eq!(a.status, MarkStatus::TooManyCandidates);
    }

    #[test]
    fn empty_section_has_no_cells() {
        let a = CellMarkAnalyzer::default().analyze(&[], None);
        assert_eq!(a.status, MarkStatus::NoCells);
        assert!(a.scores.is_empty());
        assert_eq!(a.baseline, None);
    }

    #[test]
    fn only_success_statuses_are_authoritative() {
        use MarkStatus::*;
        for status in [
            NotProcessed,
            InvalidGrid,
            NoCells,
            NoMark,
            NoCandidate,
            AmbiguousTwo,
            TooManyCandidates,
        ] {
            assert!(!is_authoritative(Some(0), status), "{status}");
        }
        assert!(is_authoritative(Some(3), SingleCandidate));
        assert!(is_authoritative(Some(3), TwoCandidatesResolved));
        assert!(!is_authoritative(None, SingleCandidate));
    }

    fn cell_with_mark(marked: bool) -> Cell {
        let (w, h) = (30usize, 40usize);
        let mut gray = GrayImageU8::filled(w, h, 240);
        if marked {
            // Diagonal stroke in the bottom half.
            for i in 0..14 {
                for t in 0..3 {
                    gray.set(8 + i + t, 23 + i, 20);
                }
            }
        }
        // Printed label in the top half must not count.
        for x in 5..25 {
            gray.set(x, 8, 30);
        }
        Cell {
            image: PageImage::from_gray(gray),
            rect: PixelRect::new(0, 0, w, h),
        }
    }

    #[test]
    fn scoring_ignores_the_top_half() {
        let params = MarkParams::default();
        assert_eq!(score_cell(&cell_with_mark(false).image, &params), 0);
        assert!(score_cell(&cell_with_mark(true).image, &params) >= 30);
    }

    #[test]
    fn analysis_is_deterministic() {
        let cells: Vec<Cell> = (0..6).map(|i| cell_with_mark(i == 4)).collect();
        let analyzer = CellMarkAnalyzer::default();
        let first = analyzer.analyze(&cells, None);
        assert_eq!(first.status, MarkStatus::SingleCandidate);
        assert_eq!(first.chosen, Some(4));
        for _ in 0..3 {
            assert_eq!(analyzer.analyze(&cells, None), first);
        }
    }
}
