//! Indexing pipeline: language resolution and structural segmentation
//!
//! One uploaded file flows through [`language::Language::from_path`] (the
//! grammar registry) and [`segmenter::segment`] to become a list of code
//! units. The [`crate::index_store`] drives this per file and owns the
//! results.

pub mod language;
pub mod segmenter;

pub use language::Language;
pub use segmenter::{segment, Segmented};
