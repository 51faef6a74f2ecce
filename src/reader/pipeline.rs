//! Page reader driving the grade extraction end-to-end.
//!
//! The [`GradeReader`] exposes a simple API: feed a page (or a path) and get
//! a [`PageResult`] row, optionally with a full [`PageTrace`]. Internally it
//! turns the page upright, crops the answer row, binarizes it, finds the
//! ruling lines, builds the cell lattice and resolves one mark per section.
//!
//! Typical usage:
//! ```no_run
//! use grade_grid::{GradeParams, GradeReader};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), grade_grid::GradeError> {
//! let reader = GradeReader::new(GradeParams::default())?;
//! let result = reader.process_path(Path::new("scans/page_001.jpg"));
//! match result.note_detected {
//!     Some(grade) => println!("{}: {grade:.2}", result.filename),
//!     None => println!("{}: {:?}", result.filename, result.error),
//! }
//! # Ok(())
//! # }
//! ```
use super::params::GradeParams;
use super::result::{compose_grade, PageError, PageResult};
use crate::binarize::Binarizer;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{DetailedPageResult, InputDescriptor, PageTrace, SectionTrace};
use crate::error::GradeError;
use crate::grid::GridBuilder;
use crate::image::io::load_page_image;
use crate::image::PageImage;
use crate::marks::{CellMarkAnalyzer, MarkStatus};
use crate::orientation::{correct_orientation, FiducialLocator, QrFiducialLocator};
use crate::projection::ProjectionLineFinder;
use crate::region::extract_region;
use log::{debug, warn};
use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;

/// Reads grades from answer-sheet pages.
///
/// Holds only read-only configuration, so one reader can serve many pages
/// (and many threads when `L` is `Sync`).
#[derive(Clone, Debug)]
pub struct GradeReader<L = QrFiducialLocator> {
    params: GradeParams,
    binarizer: Binarizer,
    line_finder: ProjectionLineFinder,
    grid_builder: GridBuilder,
    analyzer: CellMarkAnalyzer,
    locator: L,
}

impl GradeReader<QrFiducialLocator> {
    /// Reader with the QR-based orientation check.
    pub fn new(params: GradeParams) -> Result<Self, GradeError> {
        Self::with_locator(params, QrFiducialLocator)
    }
}

impl<L: FiducialLocator> GradeReader<L> {
    /// Reader using `locator` for orientation; fails on invalid parameters.
    pub fn with_locator(params: GradeParams, locator: L) -> Result<Self, GradeError> {
        params.validate()?;
        Ok(Self {
            binarizer: Binarizer::new(params.binarize.clone()),
            line_finder: ProjectionLineFinder::new(params.lines.clone()),
            grid_builder: GridBuilder::new(params.grid.clone()),
            analyzer: CellMarkAnalyzer::new(params.marks.clone()),
            params,
            locator,
        })
    }

    pub fn params(&self) -> &GradeParams {
        &self.params
    }

    /// Load and grade the image at `path`. Never fails: load errors become
    /// `image_not_found` rows.
    pub fn process_path(&self, path: &Path) -> PageResult {
        self.process_path_with_diagnostics(path).result
    }

    pub fn process_path_with_diagnostics(&self, path: &Path) -> DetailedPageResult {
        let name = page_name(path);
        match load_page_image(path) {
            Ok(page) => self.process_with_diagnostics(&name, &page),
            Err(err) => {
                warn!("GradeReader::process_path {}: {err}", path.display());
                DetailedPageResult {
                    result: PageResult::failed(name, PageError::ImageNotFound),
                    trace: PageTrace::default(),
                }
            }
        }
    }

    /// Grade an already decoded page.
    pub fn process_image(&self, name: &str, page: &PageImage) -> PageResult {
        self.process_with_diagnostics(name, page).result
    }

    /// Grade a page and keep every intermediate result.
    pub fn process_with_diagnostics(&self, name: &str, page: &PageImage) -> DetailedPageResult {
        let total_start = Instant::now();
        let mut trace = PageTrace {
            input: Some(InputDescriptor {
                width: page.width(),
                height: page.height(),
                channels: page.channels(),
            }),
            ..Default::default()
        };
        let result = self.run(name, page, &mut trace);
        trace.timing.total_ms = elapsed_ms(total_start);
        debug!(
            "GradeReader::process {} valid_grid={} status=({}, {}) grade={:?} error={:?} in {:.2} ms",
            name,
            result.valid_grid,
            result.status_int,
            result.status_dec,
            result.note_detected,
            result.error,
            trace.timing.total_ms
        );
        DetailedPageResult { result, trace }
    }

    fn run(&self, name: &str, page: &PageImage, trace: &mut PageTrace) -> PageResult {
        let p = &self.params;
        let mut result = PageResult::new(name);

        if let Some(limit) = p.max_image_pixels {
            if page.pixel_count() > limit {
                warn!(
                    "GradeReader::process {name}: {}",
                    GradeError::ImageTooLarge {
                        pixels: page.pixel_count(),
                        limit
                    }
                );
                result.error = Some(PageError::ImageTooLarge);
                return result;
            }
        }

        let mut clock = Instant::now();
        let page: Cow<'_, PageImage> = if p.correct_orientation {
            let oriented = correct_orientation(page, &self.locator);
            trace.rotated = oriented.rotated;
            Cow::Owned(oriented.image)
        } else {
            Cow::Borrowed(page)
        };
        trace.timing.lap("orientation", &mut clock);

        let region = match extract_region(&page, &p.roi) {
            Ok(region) => region,
            Err(err) => {
                debug!("GradeReader::process {name}: {err}");
                result.error = Some(PageError::EmptyRoi);
                return result;
            }
        };
        trace.roi = Some(region.rect);
        trace.timing.lap("region", &mut clock);

        let mask = self.binarizer.binarize(&region);
        trace.timing.lap("binarize", &mut clock);

        let lines = self.line_finder.find_lines(&mask);
        trace.lines = Some(lines.clone());
        trace.mask = Some(mask);
        trace.timing.lap("lines", &mut clock);

        let grid = match self.grid_builder.build(&region, &lines) {
            Ok(grid) => grid,
            Err(rejection) => {
                debug!("GradeReader::process {name}: invalid grid ({rejection})");
                trace.grid_rejection = Some(rejection);
                result.status_int = MarkStatus::InvalidGrid;
                result.status_dec = MarkStatus::InvalidGrid;
                return result;
            }
        };
        result.valid_grid = true;
        trace.row = Some(grid.row);
        trace.timing.lap("grid", &mut clock);

        trace.sections = grid
            .sections
            .iter()
            .map(|section| SectionTrace {
                name: section.name.clone(),
                lines: section.lines.clone(),
                cells: section.cells.iter().map(|c| c.rect).collect(),
                analysis: self.analyzer.analyze(&section.cells, None),
            })
            .collect();
        trace.timing.lap("marks", &mut clock);

        // Parameters were validated to describe exactly two sections.
        let (int_trace, dec_trace) = (&trace.sections[0], &trace.sections[1]);
        result.status_int = int_trace.analysis.status;
        result.status_dec = dec_trace.analysis.status;
        result.idx_int = int_trace.analysis.chosen;
        result.idx_dec = dec_trace.analysis.chosen;

        match compose_grade(
            result.idx_int,
            result.status_int,
            result.idx_dec,
            result.status_dec,
            int_trace.cells.len(),
            &p.fractional_values,
        ) {
            Ok(grade) => result.note_detected = Some(grade),
            Err(err) => result.error = Some(err),
        }
        result
    }
}

/// File name used as the page identifier in reports.
pub fn page_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
