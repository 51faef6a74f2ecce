//! Local mean thresholding.
//!
//! For every pixel the mean of its `window × window` neighbourhood is taken
//! (border pixels replicated, mean rounded to the nearest integer). A pixel
//! at or below `mean − offset` is foreground. Dark ink on a light page thus
//! survives gradual lighting changes that would defeat one global cut.
//!
//! The box sum is separable: a horizontal pass into a `u32` buffer, then a
//! vertical pass that produces the threshold decision directly.
//!
//! Complexity: O(W·H·window).
use super::mask::{BinaryMask, FOREGROUND};
use crate::image::{ImageView, ImageViewMut};

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Binarize `gray` with a local mean threshold; `window` must be odd and ≥ 3.
pub fn adaptive_threshold_mean<I>(gray: &I, window: usize, offset: i32) -> BinaryMask
where
    I: ImageView<Pixel = u8>,
{
    let (w, h) = (gray.width(), gray.height());
    let mut mask = BinaryMask::new(w, h);
    if w == 0 || h == 0 || window == 0 {
        return mask;
    }
    let radius = (window / 2) as isize;

    let mut horiz = vec![0u32; w * h];
    for (y, row) in gray.rows().enumerate() {
        let out = &mut horiz[y * w..(y + 1) * w];
        for (x, slot) in out.iter_mut().enumerate() {
            let mut acc = 0u32;
            for dx in -radius..=radius {
                acc += row[clamp_index(x as isize + dx, w)] as u32;
            }
            *slot = acc;
        }
    }

    let area = (window * window) as u32;
    for y in 0..h {
        let src = gray.row(y);
        let out = mask.row_mut(y);
        for x in 0..w {
            let mut sum = 0u32;
            for dy in -radius..=radius {
                sum += horiz[clamp_index(y as isize + dy, h) * w + x];
            }
            let mean = ((sum + area / 2) / area) as i32;
            if (src[x] as i32) <= mean - offset {
                out[x] = FOREGROUND;
            }
        }
    }
    mask
}
