//! Batch import orchestration

mod chapters;
mod importer;

pub use chapters::ChapterMap;
pub use importer::{Importer, DEFAULT_PAGE_SUMMARY};
