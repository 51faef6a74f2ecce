//! Region binarization: adaptive mean threshold plus morphological cleanup.
//!
//! Pipeline
//! - Convert the region to single-channel intensity.
//! - Local mean threshold (see [`adaptive`]) marks dark ink as foreground.
//! - Opening with a small square removes isolated specks left by paper
//!   texture and scanner noise.
//! - Closing with a slightly larger square reconnects ruling lines broken by
//!   faint printing or compression artifacts.
//!
//! The resulting [`BinaryMask`] is what the projection stage measures.

pub mod adaptive;
pub mod mask;
pub mod morphology;

pub use adaptive::adaptive_threshold_mean;
pub use mask::{BinaryMask, BACKGROUND, FOREGROUND};

use crate::image::GrayImageU8;
use crate::region::Region;
use log::debug;
use serde::{Deserialize, Serialize};

/// Knobs for [`Binarizer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeParams {
    /// Side of the square neighbourhood used for the local mean (odd).
    pub window: usize,
    /// Constant subtracted from the local mean.
    pub offset: i32,
    /// Side of the square element used for opening.
    pub open_kernel: usize,
    /// Side of the square element used for closing.
    pub close_kernel: usize,
    /// Iterations for both morphology steps.
    pub iterations: usize,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self {
            window: 15,
            offset: 8,
            open_kernel: 3,
            close_kernel: 5,
            iterations: 1,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Binarizer {
    params: BinarizeParams,
}

impl Binarizer {
    pub fn new(params: BinarizeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BinarizeParams {
        &self.params
    }

    /// Threshold and clean an intensity image.
    pub fn binarize_gray(&self, gray: &GrayImageU8) -> BinaryMask {
        let p = &self.params;
        let raw = adaptive_threshold_mean(gray, p.window, p.offset);
        let opened = morphology::open(&raw, p.open_kernel, p.iterations);
        let cleaned = morphology::close(&opened, p.close_kernel, p.iterations);
        debug!(
            "Binarizer::binarize fg raw={} opened={} cleaned={}",
            raw.count_foreground(),
            opened.count_foreground(),
            cleaned.count_foreground()
        );
        cleaned
    }

    pub fn binarize(&self, region: &Region) -> BinaryMask {
        self.binarize_gray(&region.image.to_gray())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageView;

    #[test]
    fn drops_specks_but_keeps_ruling_lines() {
        let mut gray = GrayImageU8::filled(40, 40, 250);
        for x in 0..40 {
            for y in 19..22 {
                gray.set(x, y, 10);
            }
        }
        gray.set(5, 5, 0);
        gray.set(30, 33, 0);

        let mask = Binarizer::default().binarize_gray(&gray);
        assert_eq!(mask.width(), 40);
        assert_eq!(mask.height(), 40);
        assert!(!mask.is_foreground(5, 5));
        assert!(!mask.is_foreground(30, 33));
        for x in 0..40 {
            assert!(mask.is_foreground(x, 20), "line broken at x={x}");
        }
    }

    #[test]
    fn closing_reconnects_broken_stroke() {
        let mut gray = GrayImageU8::filled(40, 40, 250);
        for x in (0..18).chain(21..40) {
            for y in 19..22 {
                gray.set(x, y, 10);
            }
        }
        let mask = Binarizer::default().binarize_gray(&gray);
        assert!(mask.is_foreground(19, 20));
    }
}
