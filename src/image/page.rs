//! Owned page raster with one (gray) or three (RGB) interleaved channels.
//!
//! Pages arrive from the decoder in whatever layout the file had; every
//! thresholding stage works on [`PageImage::to_gray`]. Crops and rotations
//! always return new buffers so the caller's image is never touched.
use super::traits::ImageView;
use super::u8::GrayImageU8;
use crate::types::PixelRect;
use image::DynamicImage;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channels {
    Gray,
    Rgb,
}

impl Channels {
    #[inline]
    pub fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageImage {
    width: usize,
    height: usize,
    channels: Channels,
    data: Vec<u8>,
}

/// ITU-R BT.601 luma in 14-bit fixed point, rounded.
#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    ((r as u32 * R + g as u32 * G + b as u32 * B + (1 << 13)) >> 14) as u8
}

impl PageImage {
    pub fn from_gray(gray: GrayImageU8) -> Self {
        let (width, height) = (gray.width(), gray.height());
        Self {
            width,
            height,
            channels: Channels::Gray,
            data: gray.into_raw(),
        }
    }

    /// Wrap interleaved RGB bytes; returns `None` when the length does not match.
    pub fn from_rgb(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        (data.len() == width * height * 3).then_some(Self {
            width,
            height,
            channels: Channels::Rgb,
            data,
        })
    }

    /// Keep single-channel decodes as gray, everything else becomes RGB8.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(buf) => {
                let (w, h) = (buf.width() as usize, buf.height() as usize);
                Self {
                    width: w,
                    height: h,
                    channels: Channels::Gray,
                    data: buf.into_raw(),
                }
            }
            other => {
                let buf = other.into_rgb8();
                let (w, h) = (buf.width() as usize, buf.height() as usize);
                Self {
                    width: w,
                    height: h,
                    channels: Channels::Rgb,
                    data: buf.into_raw(),
                }
            }
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Single-channel intensity copy.
    pub fn to_gray(&self) -> GrayImageU8 {
        let data = match self.channels {
            Channels::Gray => self.data.clone(),
            Channels::Rgb => self
                .data
                .chunks_exact(3)
                .map(|px| luma(px[0], px[1], px[2]))
                .collect(),
        };
        // Length is width * height by construction.
        GrayImageU8::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| GrayImageU8::filled(0, 0, 0))
    }

    /// Copy of the pixels inside `rect`, clamped to the image.
    pub fn crop(&self, rect: PixelRect) -> PageImage {
        let x0 = rect.x.min(self.width);
        let y0 = rect.y.min(self.height);
        let w = rect.width.min(self.width - x0);
        let h = rect.height.min(self.height - y0);
        let c = self.channels.count();
        let row_bytes = self.width * c;
        let mut data = Vec::with_capacity(w * h * c);
        for y in y0..y0 + h {
            let start = y * row_bytes + x0 * c;
            data.extend_from_slice(&self.data[start..start + w * c]);
        }
        PageImage {
            width: w,
            height: h,
            channels: self.channels,
            data,
        }
    }

    /// Rows `[y0, y1)` over the full width.
    pub fn crop_rows(&self, y0: usize, y1: usize) -> PageImage {
        let y0 = y0.min(self.height);
        let y1 = y1.clamp(y0, self.height);
        self.crop(PixelRect::new(0, y0, self.width, y1 - y0))
    }

    /// Upside-down copy (rotation by 180°).
    pub fn rotated_180(&self) -> PageImage {
        let c = self.channels.count();
        let mut data = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(c).rev() {
            data.extend_from_slice(px);
        }
        PageImage {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data,
        }
    }
}
