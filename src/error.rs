use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the library outside of per-page classification.
///
/// Per-page outcomes (invalid grid, ambiguous marks, ...) are not errors at
/// this level; they are recorded in [`PageResult`](crate::PageResult).
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("failed to load image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image {}: {source}", path.display())]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("region is empty after clamping ({width}x{height} px)")]
    EmptyRegion { width: i64, height: i64 },

    #[error("image has {pixels} pixels, above the configured limit of {limit}")]
    ImageTooLarge { pixels: usize, limit: usize },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GradeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GradeError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        GradeError::Json {
            path: path.into(),
            source,
        }
    }
}
