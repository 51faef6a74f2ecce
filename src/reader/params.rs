//! Parameter types configuring the page reader.
//!
//! Everything is JSON-loadable; omitted fields fall back to the defaults,
//! which match the printed answer sheet the reader was tuned on (a single
//! row of 21 integer boxes and 4 quarter-point boxes a quarter of the way
//! down the page).

use crate::binarize::BinarizeParams;
use crate::error::GradeError;
use crate::grid::GridLayout;
use crate::marks::MarkParams;
use crate::projection::LineParams;
use crate::types::RelativeRect;
use serde::{Deserialize, Serialize};

/// Location of the answer row on an upright page.
pub const DEFAULT_ROI: RelativeRect = RelativeRect::new(0.0, 0.2391, 0.98, 0.1056);

/// Reader-wide parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeParams {
    /// Answer row as fractions of the page size.
    pub roi: RelativeRect,
    pub binarize: BinarizeParams,
    pub lines: LineParams,
    pub grid: GridLayout,
    pub marks: MarkParams,
    /// Value of each fractional box, left to right.
    pub fractional_values: Vec<f64>,
    /// Look for the orientation fiducial and turn upside-down pages.
    pub correct_orientation: bool,
    /// Pages with more pixels are refused before any processing.
    pub max_image_pixels: Option<usize>,
}

impl Default for GradeParams {
    fn default() -> Self {
        Self {
            roi: DEFAULT_ROI,
            binarize: BinarizeParams::default(),
            lines: LineParams::default(),
            grid: GridLayout::default(),
            marks: MarkParams::default(),
            fractional_values: vec![0.0, 0.25, 0.5, 0.75],
            correct_orientation: true,
            max_image_pixels: Some(80_000_000),
        }
    }
}

fn check(ok: bool, msg: impl FnOnce() -> String) -> Result<(), GradeError> {
    if ok {
        Ok(())
    } else {
        Err(GradeError::InvalidConfig(msg()))
    }
}

impl GradeParams {
    /// Reject combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), GradeError> {
        let roi = &self.roi;
        check(
            [roi.x, roi.y, roi.width, roi.height]
                .iter()
                .all(|v| v.is_finite()),
            || format!("roi must be finite, got {roi:?}"),
        )?;
        check(roi.width > 0.0 && roi.height > 0.0, || {
            format!("roi extent must be positive, got {roi:?}")
        })?;
        check(
            [roi.x, roi.y, roi.width, roi.height]
                .iter()
                .all(|v| (-1.0..=2.0).contains(v)),
            || format!("roi components must lie in [-1, 2], got {roi:?}"),
        )?;

        for (name, window) in [("binarize", self.binarize.window), ("marks", self.marks.window)] {
            check(window >= 3 && window % 2 == 1, || {
                format!("{name}.window must be odd and >= 3, got {window}")
            })?;
        }

        let m = &self.lines.margins;
        check(
            [m.top, m.bottom, m.left, m.right]
                .iter()
                .all(|v| (0.0..0.5).contains(v)),
            || format!("lines.margins must lie in [0, 0.5), got {m:?}"),
        )?;
        for (name, t) in [
            ("horizontal_threshold", self.lines.horizontal_threshold),
            ("vertical_threshold", self.lines.vertical_threshold),
        ] {
            check((0.0..1.0).contains(&t), || {
                format!("lines.{name} must lie in [0, 1), got {t}")
            })?;
        }

        check(self.grid.sections.len() == 2, || {
            format!(
                "grid.sections must name the integer and fractional sections, got {}",
                self.grid.sections.len()
            )
        })?;
        check(self.grid.min_vertical_lines >= self.grid.sections.len() + 1, || {
            format!(
                "grid.min_vertical_lines must be at least {}",
                self.grid.sections.len() + 1
            )
        })?;
        let frac_cells = self.grid.sections[1].expected_cells;
        check(self.fractional_values.len() == frac_cells, || {
            format!(
                "fractional_values has {} entries, fractional section expects {} cells",
                self.fractional_values.len(),
                frac_cells
            )
        })?;

        let mk = &self.marks;
        check(mk.threshold_divisor > 0.0 && mk.threshold_divisor.is_finite(), || {
            format!("marks.threshold_divisor must be positive, got {}", mk.threshold_divisor)
        })?;
        check(mk.max_candidates >= 2, || {
            format!("marks.max_candidates must be at least 2, got {}", mk.max_candidates)
        })?;
        check((0.0..=1.0).contains(&mk.min_margin), || {
            format!("marks.min_margin must lie in [0, 1], got {}", mk.min_margin)
        })?;
        Ok(())
    }
}
