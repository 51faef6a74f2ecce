//! Region-of-interest extraction from relative page coordinates.
//!
//! Fractions are scaled by the page size and truncated toward zero; the
//! origin is raised to 0 when negative and the extent is shrunk so the
//! rectangle never leaves the page. A rectangle that ends up with no width
//! or no height is reported as [`GradeError::EmptyRegion`].
use crate::error::GradeError;
use crate::image::PageImage;
use crate::types::{PixelRect, RelativeRect};
use log::debug;

/// Owned crop of a page together with the rectangle it was cut from.
#[derive(Clone, Debug)]
pub struct Region {
    pub image: PageImage,
    pub rect: PixelRect,
}

impl Region {
    pub fn width(&self) -> usize {
        self.image.width()
    }

    pub fn height(&self) -> usize {
        self.image.height()
    }
}

/// Resolve `rel` against a `width × height` image.
pub fn resolve_rect(
    width: usize,
    height: usize,
    rel: &RelativeRect,
) -> Result<PixelRect, GradeError> {
    let (img_w, img_h) = (width as i64, height as i64);
    // `as` truncates toward zero and maps NaN to 0.
    let mut x = (rel.x * width as f64) as i64;
    let mut y = (rel.y * height as f64) as i64;
    let mut w = (rel.width * width as f64) as i64;
    let mut h = (rel.height * height as f64) as i64;

    x = x.max(0);
    y = y.max(0);
    if x.saturating_add(w) > img_w {
        w = img_w - x;
    }
    if y.saturating_add(h) > img_h {
        h = img_h - y;
    }
    if w <= 0 || h <= 0 {
        return Err(GradeError::EmptyRegion {
            width: w,
            height: h,
        });
    }
    Ok(PixelRect::new(x as usize, y as usize, w as usize, h as usize))
}

/// Crop `rel` out of `image` as an independent copy.
pub fn extract_region(image: &PageImage, rel: &RelativeRect) -> Result<Region, GradeError> {
    let rect = resolve_rect(image.width(), image.height(), rel)?;
    debug!(
        "extract_region page={}x{} rect=({}, {}, {}x{})",
        image.width(),
        image.height(),
        rect.x,
        rect.y,
        rect.width,
        rect.height
    );
    Ok(Region {
        image: image.crop(rect),
        rect,
    })
}
