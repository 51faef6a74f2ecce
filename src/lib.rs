#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod reader;
pub mod report;
pub mod types;

// Pipeline stages – public for tools and tuning, considered internals.
pub mod binarize;
pub mod grid;
pub mod marks;
pub mod orientation;
pub mod projection;
pub mod region;

// --- High-level re-exports -------------------------------------------------

// Main entry points: reader + results.
pub use crate::error::GradeError;
pub use crate::reader::{GradeParams, GradeReader, PageError, PageResult};

// Per-page diagnostics returned by the reader.
pub use crate::diagnostics::{DetailedPageResult, PageTrace};

pub use crate::marks::MarkStatus;
pub use crate::orientation::{FiducialLocator, NoFiducial, QrFiducialLocator};
pub use crate::types::{PixelRect, RelativeRect};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use grade_grid::prelude::*;
///
/// # fn main() -> Result<(), GradeError> {
/// let reader = GradeReader::with_locator(GradeParams::default(), NoFiducial)?;
/// let page = PageImage::from_gray(GrayImageU8::filled(1240, 1754, 255));
/// let result = reader.process_image("blank.png", &page);
/// println!("valid_grid={} status={}", result.valid_grid, result.status_int);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{GrayImageU8, ImageU8, PageImage};
    pub use crate::{
        GradeError, GradeParams, GradeReader, MarkStatus, NoFiducial, PageResult,
    };
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    pub use crate::binarize::{adaptive_threshold_mean, BinarizeParams, Binarizer, BinaryMask};
    pub use crate::grid::{split_at_widest_gaps, Grid, GridBuilder, GridLayout, GridRejection};
    pub use crate::marks::{score_cell, CellAnalysis, CellMarkAnalyzer, MarkParams};
    pub use crate::orientation::{correct_orientation, needs_flip};
    pub use crate::projection::{
        group_centers, DetectedLines, LineParams, ProjectionLineFinder, ProjectionProfile,
    };
    pub use crate::region::{extract_region, resolve_rect, Region};
}
