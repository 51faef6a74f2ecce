//! I/O helpers for page images and JSON.
//!
//! - `load_page_image`: decode a PNG/JPEG/etc. into an owned [`PageImage`].
//! - `save_gray_png`: write any 8-bit single-channel view (masks included).
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageView, PageImage};
use crate::error::GradeError;
use image::{GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk, keeping gray decodes single-channel.
pub fn load_page_image(path: &Path) -> Result<PageImage, GradeError> {
    let img = image::open(path).map_err(|source| GradeError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PageImage::from_dynamic(img))
}

/// Save an 8-bit grayscale view to a PNG, creating parent directories.
pub fn save_gray_png<I: ImageView<Pixel = u8>>(image: &I, path: &Path) -> Result<(), GradeError> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(image.width() as u32, image.height() as u32);
    for (y, row) in image.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            out.put_pixel(x as u32, y as u32, Luma([px]));
        }
    }
    out.save(path).map_err(|source| GradeError::ImageSave {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), GradeError> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|e| GradeError::json(path, e))?;
    fs::write(path, json).map_err(|e| GradeError::io(path, e))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), GradeError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| GradeError::io(parent, e))?;
        }
    }
    Ok(())
}
