//! Bindery Core Library
//!
//! This crate provides the batch import pipeline for the Bindery document
//! library. Markdown, HTML and ZIP uploads are rendered, sanitized, titled
//! and stored as pages of a book, with archive folders becoming chapters.

pub mod archive;
pub mod config;
pub mod error;
pub mod html;
pub mod import;
pub mod naming;
pub mod render;
pub mod staging;
pub mod store;
pub mod title;
pub mod types;

pub use config::ImportConfig;
pub use error::{ArchiveError, ContentError, ImportError, PersistenceError, PolicyViolation, Result};
pub use html::HtmlSanitizer;
pub use import::Importer;
pub use store::{ContentStore, JsonLibrary, MemoryStore};
pub use types::{
    BookRef, ChapterRef, Container, ImportOptions, ImportResult, ItemKind, NewPage, PageRef,
    PlanItem, UploadedItem,
};
