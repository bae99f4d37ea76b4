//! Core types shared across the import pipeline

mod container;
mod result;
pub(crate) mod upload;

pub use container::{BookRef, ChapterRef, Container, ContainerKey, NewPage, PageRef};
pub use result::ImportResult;
pub use upload::{ImportOptions, ItemKind, PlanItem, UploadedItem};
