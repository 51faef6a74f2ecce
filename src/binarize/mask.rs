use crate::image::{GrayImageU8, ImageU8, ImageView, ImageViewMut};

/// Value stored for foreground (dark ink) pixels.
pub const FOREGROUND: u8 = 255;
/// Value stored for background pixels.
pub const BACKGROUND: u8 = 0;

/// Binary foreground/background raster with the extent of its source image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    pixels: GrayImageU8,
}

impl BinaryMask {
    /// All-background mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: GrayImageU8::filled(width, height, BACKGROUND),
        }
    }

    #[inline]
    pub fn is_foreground(&self, x: usize, y: usize) -> bool {
        self.pixels.get(x, y) == FOREGROUND
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, foreground: bool) {
        let v = if foreground { FOREGROUND } else { BACKGROUND };
        self.pixels.set(x, y, v);
    }

    pub fn count_foreground(&self) -> usize {
        self.pixels
            .data()
            .iter()
            .filter(|&&v| v == FOREGROUND)
            .count()
    }

    pub fn as_view(&self) -> ImageU8<'_> {
        self.pixels.as_view()
    }
}

impl ImageView for BinaryMask {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.pixels.width()
    }
    #[inline]
    fn height(&self) -> usize {
        self.pixels.height()
    }
    #[inline]
    fn stride(&self) -> usize {
        self.pixels.stride()
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        self.pixels.row(y)
    }
}

impl ImageViewMut for BinaryMask {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [u8] {
        self.pixels.row_mut(y)
    }
}
