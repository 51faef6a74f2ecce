//! Binary morphology with rectangular structuring elements.
//!
//! Rectangles are separable, so erosion and dilation run as a horizontal
//! pass followed by a vertical one. The anchor sits at `k / 2`. Pixels
//! outside the mask never take part: they neither erode the border nor
//! dilate into it.
use super::mask::{BinaryMask, BACKGROUND, FOREGROUND};
use crate::image::{ImageView, ImageViewMut};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Erode,
    Dilate,
}

impl Op {
    /// Value that decides the window as soon as one pixel carries it.
    #[inline]
    fn decisive(self) -> u8 {
        match self {
            Op::Erode => BACKGROUND,
            Op::Dilate => FOREGROUND,
        }
    }
}

#[inline]
fn window(i: usize, k: usize, len: usize) -> std::ops::Range<usize> {
    let anchor = k / 2;
    let lo = i.saturating_sub(anchor);
    let hi = (i + k - anchor).min(len);
    lo..hi
}

fn rect_pass(src: &BinaryMask, k: usize, op: Op) -> BinaryMask {
    let (w, h) = (src.width(), src.height());
    let decisive = op.decisive();
    let other = if decisive == FOREGROUND {
        BACKGROUND
    } else {
        FOREGROUND
    };

    let mut tmp = BinaryMask::new(w, h);
    for y in 0..h {
        let row = src.row(y);
        let out = tmp.row_mut(y);
        for (x, slot) in out.iter_mut().enumerate() {
            *slot = if row[window(x, k, w)].contains(&decisive) {
                decisive
            } else {
                other
            };
        }
    }

    let mut out = BinaryMask::new(w, h);
    for y in 0..h {
        let rows = window(y, k, h);
        let dst = out.row_mut(y);
        for (x, slot) in dst.iter_mut().enumerate() {
            let hit = rows.clone().any(|yy| tmp.row(yy)[x] == decisive);
            *slot = if hit { decisive } else { other };
        }
    }
    out
}

fn repeat(mask: &BinaryMask, k: usize, op: Op, iterations: usize) -> BinaryMask {
    let mut cur = mask.clone();
    if k <= 1 {
        return cur;
    }
    for _ in 0..iterations {
        cur = rect_pass(&cur, k, op);
    }
    cur
}

pub fn erode(mask: &BinaryMask, k: usize, iterations: usize) -> BinaryMask {
    repeat(mask, k, Op::Erode, iterations)
}

pub fn dilate(mask: &BinaryMask, k: usize, iterations: usize) -> BinaryMask {
    repeat(mask, k, Op::Dilate, iterations)
}

/// Erosion then dilation: removes specks smaller than the element.
pub fn open(mask: &BinaryMask, k: usize, iterations: usize) -> BinaryMask {
    dilate(&erode(mask, k, iterations), k, iterations)
}

/// Dilation then erosion: bridges gaps smaller than the element.
pub fn close(mask: &BinaryMask, k: usize, iterations: usize) -> BinaryMask {
    erode(&dilate(mask, k, iterations), k, iterations)
}
