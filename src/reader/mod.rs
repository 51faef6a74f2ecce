//! Page-level grade reading.
//!
//! Modules
//! - [`params`] – configuration types for the reader and the CLI.
//! - `pipeline` – the [`GradeReader`] driving one page end-to-end.
//! - [`result`] – the [`PageResult`] record and grade composition.

pub mod params;
mod pipeline;
pub mod result;

pub use params::{GradeParams, DEFAULT_ROI};
pub use pipeline::{page_name, GradeReader};
pub use result::{compose_grade, PageError, PageResult, GRADE_EPS};
