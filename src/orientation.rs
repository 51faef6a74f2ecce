//! Page orientation from a printed fiducial.
//!
//! Answer sheets carry a QR code near the top edge. When its corners are
//! found in the lower half the page was scanned upside down and is turned
//! by 180°. Pages without a detectable fiducial are used as they are.
//!
//! The locator sits behind [`FiducialLocator`] so callers can swap in a
//! different detector (or none, see [`NoFiducial`]).
use crate::image::{ImageU8, PageImage};
use log::debug;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Finds the four corners of an orientation fiducial in a gray page.
pub trait FiducialLocator {
    fn locate(&self, gray: ImageU8<'_>) -> Option<[Point2; 4]>;
}

/// QR finder-pattern detection through `rqrr`; the payload is not decoded.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrFiducialLocator;

impl FiducialLocator for QrFiducialLocator {
    fn locate(&self, gray: ImageU8<'_>) -> Option<[Point2; 4]> {
        if gray.w == 0 || gray.h == 0 {
            return None;
        }
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(gray.w, gray.h, |x, y| gray.get(x, y));
        let grids = prepared.detect_grids();
        let grid = grids.first()?;
        Some(grid.bounds.map(|p| Point2::new(p.x as f32, p.y as f32)))
    }
}

/// Never finds anything; pages keep the orientation they were loaded with.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFiducial;

impl FiducialLocator for NoFiducial {
    fn locate(&self, _gray: ImageU8<'_>) -> Option<[Point2; 4]> {
        None
    }
}

/// True when the fiducial's mean row lies strictly below mid-height.
pub fn needs_flip(corners: &[Point2; 4], height: usize) -> bool {
    let mean_y = corners.iter().map(|p| p.y as f64).sum::<f64>() / corners.len() as f64;
    mean_y > 0.5 * height as f64
}

/// Page in reading orientation plus whether it had to be rotated.
#[derive(Clone, Debug)]
pub struct Oriented {
    pub image: PageImage,
    pub rotated: bool,
}

/// Rotate `page` by 180° when `locator` places the fiducial in its lower half.
pub fn correct_orientation<L: FiducialLocator + ?Sized>(page: &PageImage, locator: &L) -> Oriented {
    let gray = page.to_gray();
    let Some(corners) = locator.locate(gray.as_view()) else {
        debug!("correct_orientation: no fiducial found, keeping page as is");
        return Oriented {
            image: page.clone(),
            rotated: false,
        };
    };
    let rotated = needs_flip(&corners, page.height());
    debug!(
        "correct_orientation: fiducial corners={:?} rotated={}",
        corners, rotated
    );
    Oriented {
        image: if rotated {
            page.rotated_180()
        } else {
            page.clone()
        },
        rotated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayImageU8;

    struct FixedCorners([Point2; 4]);

    impl FiducialLocator for FixedCorners {
        fn locate(&self, _gray: ImageU8<'_>) -> Option<[Point2; 4]> {
            Some(self.0)
        }
    }

    fn square(y: f32) -> [Point2; 4] {
        [
            Point2::new(10.0, y),
            Point2::new(30.0, y),
            Point2::new(30.0, y + 20.0),
            Point2::new(10.0, y + 20.0),
        ]
    }

    fn marked_page() -> PageImage {
        let mut gray = GrayImageU8::filled(4, 100, 200);
        gray.set(0, 0, 7);
        PageImage::from_gray(gray)
    }

    #[test]
    fn flip_decision_uses_mean_row() {
        assert!(!needs_flip(&square(5.0), 100));
        assert!(needs_flip(&square(70.0), 100));
        // Mean row exactly at mid-height keeps the page.
        assert!(!needs_flip(&square(40.0), 100));
    }

    #[test]
    fn upside_down_page_is_rotated() {
        let page = marked_page();
        let out = correct_orientation(&page, &FixedCorners(square(70.0)));
        assert!(out.rotated);
        assert_eq!(out.image.to_gray().get(3, 99), 7);
        assert_eq!(page.to_gray().get(0, 0), 7);
    }

    #[test]
    fn upright_or_unmarked_page_is_kept() {
        let page = marked_page();
        let out = correct_orientation(&page, &FixedCorners(square(5.0)));
        assert!(!out.rotated);
        assert_eq!(out.image, page);
        let out = correct_orientation(&page, &NoFiducial);
        assert!(!out.rotated);
        assert_eq!(out.image, page);
    }

    #[test]
    fn blank_page_has_no_qr() {
        let gray = GrayImageU8::filled(64, 64, 255);
        assert!(QrFiducialLocator.locate(gray.as_view()).is_none());
    }
}
