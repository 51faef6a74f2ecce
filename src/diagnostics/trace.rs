use super::timing::TimingBreakdown;
use crate::binarize::BinaryMask;
use crate::grid::GridRejection;
use crate::image::Channels;
use crate::marks::CellAnalysis;
use crate::projection::DetectedLines;
use crate::reader::PageResult;
use crate::types::PixelRect;
use serde::Serialize;

/// Shape of the decoded page.
#[derive(Clone, Debug, Serialize)]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub channels: Channels,
}

/// What the analyzer saw in one section.
#[derive(Clone, Debug, Serialize)]
pub struct SectionTrace {
    pub name: String,
    /// Vertical line positions of the section, region coordinates.
    pub lines: Vec<usize>,
    pub cells: Vec<PixelRect>,
    pub analysis: CellAnalysis,
}

/// Intermediate results of one page, filled as far as the pipeline got.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PageTrace {
    pub input: Option<InputDescriptor>,
    pub rotated: bool,
    /// Region of interest in page coordinates (after rotation).
    pub roi: Option<PixelRect>,
    pub lines: Option<DetectedLines>,
    /// Row extent `[top, bottom)` of the accepted lattice.
    pub row: Option<(usize, usize)>,
    pub grid_rejection: Option<GridRejection>,
    pub sections: Vec<SectionTrace>,
    pub timing: TimingBreakdown,
    /// Cleaned region mask; kept for debug dumps, not serialized.
    #[serde(skip)]
    pub mask: Option<BinaryMask>,
}

/// Page record plus its trace.
#[derive(Clone, Debug, Serialize)]
pub struct DetailedPageResult {
    pub result: PageResult,
    pub trace: PageTrace,
}
