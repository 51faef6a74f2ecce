//! Ruling-line detection from projection profiles.
//!
//! Overview
//! - Crop a margin off the mask so the table's outer frame and whatever sits
//!   beyond it do not dominate the profiles.
//! - Sum foreground pixels per row (horizontal profile) and per column
//!   (vertical profile).
//! - Normalise each profile by its own maximum (floored at 1) and keep the
//!   positions above a fixed fraction as peaks.
//! - Chain peaks whose gap to the previous peak is within the merge distance;
//!   each chain collapses to its rounded mean, the line centre.
//! - Shift the centres back into the un-cropped mask's coordinates.
//!
//! A ruling line crosses almost the whole table, so its row (or column) is
//! near-saturated while hand marks and printed labels only reach a fraction
//! of that. This tolerates moderate skew as long as a line stays within the
//! merge distance over the table's extent.
use crate::binarize::{BinaryMask, FOREGROUND};
use crate::image::{ImageU8, ImageView};
use crate::types::PixelRect;
use log::debug;
use serde::{Deserialize, Serialize};

/// Ordered line-centre coordinates (rows for horizontal lines, columns for
/// vertical ones).
pub type LineSet = Vec<usize>;

/// Fractions of the mask excluded on each side before projecting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionMargins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for ProjectionMargins {
    fn default() -> Self {
        Self {
            top: 0.10,
            bottom: 0.10,
            left: 0.02,
            right: 0.02,
        }
    }
}

impl ProjectionMargins {
    pub const NONE: ProjectionMargins = ProjectionMargins {
        top: 0.0,
        bottom: 0.0,
        left: 0.0,
        right: 0.0,
    };

    /// Inner rectangle of a `width × height` mask; at least 1×1 when the mask
    /// is non-empty.
    pub fn inner_rect(&self, width: usize, height: usize) -> PixelRect {
        if width == 0 || height == 0 {
            return PixelRect::default();
        }
        let top = ((self.top * height as f64) as usize).min(height - 1);
        let bottom = (((1.0 - self.bottom) * height as f64) as usize).clamp(top + 1, height);
        let left = ((self.left * width as f64) as usize).min(width - 1);
        let right = (((1.0 - self.right) * width as f64) as usize).clamp(left + 1, width);
        PixelRect::from_bounds(left, top, right, bottom)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineParams {
    pub margins: ProjectionMargins,
    /// Normalised row density a horizontal line must exceed.
    pub horizontal_threshold: f32,
    /// Normalised column density a vertical line must exceed.
    pub vertical_threshold: f32,
    /// Largest gap (px) between consecutive peaks of the same line.
    pub merge_gap: usize,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            margins: ProjectionMargins::default(),
            horizontal_threshold: 0.70,
            vertical_threshold: 0.70,
            merge_gap: 6,
        }
    }
}

/// Per-row or per-column foreground counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectionProfile {
    sums: Vec<u32>,
}

impl ProjectionProfile {
    /// One entry per row of `mask`.
    pub fn rows<I: ImageView<Pixel = u8>>(mask: &I) -> Self {
        let sums = mask
            .rows()
            .map(|row| row.iter().filter(|&&v| v == FOREGROUND).count() as u32)
            .collect();
        Self { sums }
    }

    /// One entry per column of `mask`.
    pub fn columns<I: ImageView<Pixel = u8>>(mask: &I) -> Self {
        let mut sums = vec![0u32; mask.width()];
        for row in mask.rows() {
            for (acc, &v) in sums.iter_mut().zip(row) {
                if v == FOREGROUND {
                    *acc += 1;
                }
            }
        }
        Self { sums }
    }

    pub fn from_sums(sums: Vec<u32>) -> Self {
        Self { sums }
    }

    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    pub fn sums(&self) -> &[u32] {
        &self.sums
    }

    /// Values divided by the profile maximum (a maximum of 0 counts as 1).
    pub fn normalized(&self) -> Vec<f32> {
        let max = self.sums.iter().copied().max().unwrap_or(0).max(1) as f32;
        self.sums.iter().map(|&s| s as f32 / max).collect()
    }

    /// Indices whose normalised value strictly exceeds `threshold`.
    pub fn peaks(&self, threshold: f32) -> Vec<usize> {
        self.normalized()
            .into_iter()
            .enumerate()
            .filter_map(|(i, v)| (v > threshold).then_some(i))
            .collect()
    }
}

/// Chain sorted positions into groups: a position joins the current group
/// when it is within `merge_gap` of the group's last member.
pub fn group_positions(positions: &[usize], merge_gap: usize) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for &p in positions {
        if let Some(cur) = groups.last_mut() {
            if cur.last().is_some_and(|&last| p.abs_diff(last) <= merge_gap) {
                cur.push(p);
                continue;
            }
        }
        groups.push(vec![p]);
    }
    groups
}

/// Rounded mean of each group from [`group_positions`].
pub fn group_centers(positions: &[usize], merge_gap: usize) -> LineSet {
    group_positions(positions, merge_gap)
        .iter()
        .map(|g| {
            let sum: usize = g.iter().sum();
            (sum as f64 / g.len() as f64).round() as usize
        })
        .collect()
}

/// Lines found in one mask, in the mask's coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DetectedLines {
    pub horizontal: LineSet,
    pub vertical: LineSet,
    /// Inner rectangle the profiles were measured on.
    pub search_area: PixelRect,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectionLineFinder {
    params: LineParams,
}

impl ProjectionLineFinder {
    pub fn new(params: LineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LineParams {
        &self.params
    }

    pub fn find_lines(&self, mask: &BinaryMask) -> DetectedLines {
        let p = &self.params;
        let area = p.margins.inner_rect(mask.width(), mask.height());
        if area.is_empty() {
            return DetectedLines::default();
        }
        let view: ImageU8<'_> = mask.as_view().sub_view(area);

        let h_peaks = ProjectionProfile::rows(&view).peaks(p.horizontal_threshold);
        let v_peaks = ProjectionProfile::columns(&view).peaks(p.vertical_threshold);

        let horizontal: LineSet = group_centers(&h_peaks, p.merge_gap)
            .into_iter()
            .map(|y| y + area.y)
            .collect();
        let vertical: LineSet = group_centers(&v_peaks, p.merge_gap)
            .into_iter()
            .map(|x| x + area.x)
            .collect();

        debug!(
            "ProjectionLineFinder::find_lines area=({}, {}, {}x{}) peaks h={} v={} lines h={:?} v={:?}",
            area.x,
            area.y,
            area.width,
            area.height,
            h_peaks.len(),
            v_peaks.len(),
            horizontal,
            vertical
        );
        DetectedLines {
            horizontal,
            vertical,
            search_area: area,
        }
    }
}
