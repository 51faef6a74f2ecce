//! Diagnostics data model returned by
//! [`GradeReader::process_with_diagnostics`](crate::GradeReader::process_with_diagnostics).
//!
//! A [`DetailedPageResult`] pairs the plain [`PageResult`](crate::PageResult)
//! with a [`PageTrace`] describing every stage the page went through: the
//! resolved region, detected lines, the lattice (or why it was rejected),
//! per-section scores and stage timings. The CLI writes it as JSON next to
//! the cleaned mask when a debug directory is given.

pub mod timing;
pub mod trace;

pub use timing::{StageTiming, TimingBreakdown};
pub use trace::{DetailedPageResult, InputDescriptor, PageTrace, SectionTrace};
