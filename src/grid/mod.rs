//! Cell lattice construction from detected ruling lines.
//!
//! The answer table is one row of checkboxes split into sections (integer
//! part, fractional part) that are printed with extra whitespace between
//! them. Given the line sets of a region:
//! - the row spans from the first to the last horizontal line; interior
//!   horizontal lines are ignored, so a sheet with several stacked answer
//!   rows is not supported;
//! - vertical lines are split into sections at the widest gaps
//!   ([`split_at_widest_gaps`]);
//! - every pair of consecutive vertical lines inside a section bounds one
//!   cell, copied out of the region.
//!
//! The lattice is rejected when too few lines were found or when the total
//! cell count strays from the layout by more than the configured tolerance.
//! Small per-section deviations (a missed or spurious line) are accepted.

mod split;

pub use split::split_at_widest_gaps;

use crate::image::PageImage;
use crate::projection::DetectedLines;
use crate::region::Region;
use crate::types::PixelRect;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expected shape of one section of the answer row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    pub expected_cells: usize,
}

impl SectionSpec {
    pub fn new(name: impl Into<String>, expected_cells: usize) -> Self {
        Self {
            name: name.into(),
            expected_cells,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Sections from left to right.
    pub sections: Vec<SectionSpec>,
    /// Allowed |found − expected| over the total cell count.
    pub cell_count_tolerance: usize,
    pub min_horizontal_lines: usize,
    pub min_vertical_lines: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            sections: vec![
                SectionSpec::new("integer", 21),
                SectionSpec::new("fractional", 4),
            ],
            cell_count_tolerance: 2,
            min_horizontal_lines: 2,
            min_vertical_lines: 3,
        }
    }
}

impl GridLayout {
    pub fn expected_total(&self) -> usize {
        self.sections.iter().map(|s| s.expected_cells).sum()
    }
}

/// One checkbox cut out of the region.
#[derive(Clone, Debug)]
pub struct Cell {
    pub image: PageImage,
    /// Bounds in region coordinates.
    pub rect: PixelRect,
}

#[derive(Clone, Debug)]
pub struct Section {
    pub name: String,
    /// Vertical line positions belonging to this section.
    pub lines: Vec<usize>,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug)]
pub struct Grid {
    /// Row extent `[top, bottom)` shared by all cells.
    pub row: (usize, usize),
    pub sections: Vec<Section>,
}

impl Grid {
    pub fn cell_count(&self) -> usize {
        self.sections.iter().map(|s| s.cells.len()).sum()
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }
}

/// Why a lattice was not accepted.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GridRejection {
    #[error("too few lines: {horizontal} horizontal (need {min_horizontal}), {vertical} vertical (need {min_vertical})")]
    TooFewLines {
        horizontal: usize,
        vertical: usize,
        min_horizontal: usize,
        min_vertical: usize,
    },
    #[error("{vertical} vertical lines cannot form {sections} sections")]
    CannotSplit { vertical: usize, sections: usize },
    #[error("found {found} cells, expected {expected} ± {tolerance}")]
    CellCountMismatch {
        found: usize,
        expected: usize,
        tolerance: usize,
    },
}

#[derive(Clone, Debug, Default)]
pub struct GridBuilder {
    layout: GridLayout,
}

impl GridBuilder {
    pub fn new(layout: GridLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Build the cell lattice of `region` from its detected lines.
    pub fn build(&self, region: &Region, lines: &DetectedLines) -> Result<Grid, GridRejection> {
        let layout = &self.layout;
        let (h, v) = (&lines.horizontal, &lines.vertical);
        if h.len() < layout.min_horizontal_lines.max(2) || v.len() < layout.min_vertical_lines {
            debug!(
                "GridBuilder::build rejected: h={} v={} lines",
                h.len(),
                v.len()
            );
            return Err(GridRejection::TooFewLines {
                horizontal: h.len(),
                vertical: v.len(),
                min_horizontal: layout.min_horizontal_lines,
                min_vertical: layout.min_vertical_lines,
            });
        }
        let (y1, y2) = (h[0], h[h.len() - 1]);

        let parts = split_at_widest_gaps(v, layout.sections.len()).ok_or(
            GridRejection::CannotSplit {
                vertical: v.len(),
                sections: layout.sections.len(),
            },
        )?;

        let sections: Vec<Section> = layout
            .sections
            .iter()
            .zip(parts)
            .map(|(spec, xs)| {
                let cells = xs
                    .windows(2)
                    .map(|pair| {
                        let rect = PixelRect::from_bounds(pair[0], y1, pair[1], y2);
                        Cell {
                            image: region.image.crop(rect),
                            rect,
                        }
                    })
                    .collect::<Vec<_>>();
                if cells.len() != spec.expected_cells {
                    debug!(
                        "GridBuilder::build section '{}' has {} cells, layout expects {}",
                        spec.name,
                        cells.len(),
                        spec.expected_cells
                    );
                }
                Section {
                    name: spec.name.clone(),
                    lines: xs.to_vec(),
                    cells,
                }
            })
            .collect();

        let grid = Grid {
            row: (y1, y2),
            sections,
        };
        let found = grid.cell_count();
        let expected = layout.expected_total();
        if found.abs_diff(expected) > layout.cell_count_tolerance {
            debug!(
                "GridBuilder::build rejected: {} cells vs expected {}",
                found, expected
            );
            return Err(GridRejection::CellCountMismatch {
                found,
                expected,
                tolerance: layout.cell_count_tolerance,
            });
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayImageU8;

    fn blank_region(w: usize, h: usize) -> Region {
        Region {
            image: PageImage::from_gray(GrayImageU8::filled(w, h, 255)),
            rect: PixelRect::new(0, 0, w, h),
        }
    }

    fn lines(horizontal: Vec<usize>, vertical: Vec<usize>) -> DetectedLines {
        DetectedLines {
            horizontal,
            vertical,
            search_area: PixelRect::default(),
        }
    }

    /// 22 integer lines 20 px apart, a 50 px gap, then 5 fractional lines.
    fn standard_vertical() -> Vec<usize> {
        let mut v: Vec<usize> = (0..22).map(|i| 10 + 20 * i).collect();
        let last = *v.last().unwrap();
        v.extend((0..5).map(|i| last + 50 + 25 * i));
        v
    }

    #[test]
    fn builds_integer_and_fractional_sections() {
        let region = blank_region(700, 80);
        let grid = GridBuilder::default()
            .build(&region, &lines(vec![10, 40, 70], standard_vertical()))
            .unwrap();
        assert_eq!(grid.row, (10, 70));
        assert_eq!(grid.sections.len(), 2);
        assert_eq!(grid.sections[0].cells.len(), 21);
        assert_eq!(grid.sections[1].cells.len(), 4);
        let first = &grid.sections[0].cells[0];
        assert_eq!(first.rect, PixelRect::new(10, 10, 20, 60));
        assert_eq!((first.image.width(), first.image.height()), (20, 60));
        let frac = &grid.sections[1].cells[0];
        assert_eq!(frac.rect.x, 10 + 20 * 21 + 50);
        assert_eq!(frac.rect.width, 25);
    }

    #[test]
    fn rejects_too_few_lines() {
        let region = blank_region(100, 50);
        let err = GridBuilder::default()
            .build(&region, &lines(vec![10], vec![10, 20, 30]))
            .unwrap_err();
        assert!(matches!(err, GridRejection::TooFewLines { horizontal: 1, .. }));
        let err = GridBuilder::default()
            .build(&region, &lines(vec![10, 40], vec![10, 20]))
            .unwrap_err();
        assert!(matches!(err, GridRejection::TooFewLines { vertical: 2, .. }));
    }

    #[test]
    fn tolerates_small_cell_count_drift() {
        let region = blank_region(700, 80);
        let mut v = standard_vertical();
        v.remove(3);
        v.remove(7);
        let grid = GridBuilder::default()
            .build(&region, &lines(vec![10, 70], v))
            .unwrap();
        assert_eq!(grid.cell_count(), 23);
    }

    #[test]
    fn rejects_cell_count_far_from_layout() {
        let region = blank_region(800, 80);
        // Equal gaps cut after the first line: 0 + 30 cells.
        let v: Vec<usize> = (0..32).map(|i| 10 + 20 * i).collect();
        let err = GridBuilder::default()
            .build(&region, &lines(vec![10, 70], v))
            .unwrap_err();
        assert_eq!(
            err,
            GridRejection::CellCountMismatch {
                found: 30,
                expected: 25,
                tolerance: 2
            }
        );
    }
}
