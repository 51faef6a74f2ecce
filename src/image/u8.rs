//! 8-bit single-channel rasters: a borrowed strided view and an owned buffer.
use super::traits::{ImageView, ImageViewMut};
use crate::types::PixelRect;

/// Borrowed 8-bit grayscale view. `stride` may exceed `w` for sub-views.
#[derive(Clone, Copy, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Borrow the rectangle `rect` without copying; the rectangle is clamped
    /// to the view.
    pub fn sub_view(&self, rect: PixelRect) -> ImageU8<'a> {
        let x = rect.x.min(self.w);
        let y = rect.y.min(self.h);
        let w = rect.width.min(self.w - x);
        let h = rect.height.min(self.h - y);
        if w == 0 || h == 0 {
            return ImageU8 {
                w: 0,
                h: 0,
                stride: 0,
                data: &[],
            };
        }
        let start = y * self.stride + x;
        let end = start + (h - 1) * self.stride + w;
        ImageU8 {
            w,
            h,
            stride: self.stride,
            data: &self.data[start..end],
        }
    }

    /// Copy the view into a tightly packed owned buffer.
    pub fn to_owned_image(&self) -> GrayImageU8 {
        let mut data = Vec::with_capacity(self.w * self.h);
        for row in self.rows() {
            data.extend_from_slice(row);
        }
        GrayImageU8 {
            width: self.w,
            height: self.h,
            data,
        }
    }
}

impl<'a> ImageView for ImageU8<'a> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

/// Owned 8-bit grayscale buffer (stride == width).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    /// Wrap raw bytes; returns `None` when the length does not match.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        (data.len() == width * height).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer of `width × height` pixels all set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.width,
            data: &self.data,
        }
    }
}

impl ImageView for GrayImageU8 {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.width
    }
    #[inline]
    fn height(&self) -> usize {
        self.height
    }
    #[inline]
    fn stride(&self) -> usize {
        self.width
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }
}

impl ImageViewMut for GrayImageU8 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_view_borrows_with_parent_stride() {
        let data: Vec<u8> = (0..20).collect();
        let img = GrayImageU8::from_raw(5, 4, data).unwrap();
        let view = img.as_view().sub_view(PixelRect::new(1, 1, 3, 2));
        assert_eq!(view.w, 3);
        assert_eq!(view.h, 2);
        assert_eq!(view.stride, 5);
        assert_eq!(view.row(0), &[6, 7, 8]);
        assert_eq!(view.row(1), &[11, 12, 13]);
        assert_eq!(view.to_owned_image().data(), &[6, 7, 8, 11, 12, 13]);
    }

    #[test]
    fn sub_view_clamps_to_parent() {
        let img = GrayImageU8::filled(4, 4, 9);
        let view = img.as_view().sub_view(PixelRect::new(3, 2, 10, 10));
        assert_eq!((view.w, view.h), (1, 2));
        let empty = img.as_view().sub_view(PixelRect::new(4, 0, 2, 2));
        assert!(empty.is_empty());
    }

    #[test]
    fn from_raw_rejects_length_mismatch() {
        assert!(GrayImageU8::from_raw(3, 3, vec![0; 8]).is_none());
    }
}
