//! Persistence layer abstraction
//!
//! The importer never writes pages or chapters itself; it goes through a
//! [`ContentStore`]. Two implementations ship with the crate: an in-memory
//! store and a JSON-file-backed library built on top of it.

mod json;
mod memory;

pub use json::JsonLibrary;
pub use memory::{BookRecord, ChapterRecord, Library, MemoryStore, PageRecord};

use crate::error::PersistenceError;
use crate::types::{BookRef, ChapterRef, Container, NewPage, PageRef};
use uuid::Uuid;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, PersistenceError>;

/// Where books, chapters and pages are read from and written to
pub trait ContentStore: Send + Sync {
    /// Look up a book by id
    fn find_book(&self, id: Uuid) -> StoreResult<BookRef>;

    /// All chapters of a book
    fn list_chapters(&self, book: &BookRef) -> StoreResult<Vec<ChapterRef>>;

    /// Names of all chapters of a book
    fn list_chapter_names(&self, book: &BookRef) -> StoreResult<Vec<String>> {
        Ok(self
            .list_chapters(book)?
            .into_iter()
            .map(|chapter| chapter.name)
            .collect())
    }

    /// Names of the pages directly inside a container
    fn list_page_names(&self, container: &Container) -> StoreResult<Vec<String>>;

    /// Create a chapter in a book
    fn create_chapter(&self, book: &BookRef, name: &str) -> StoreResult<ChapterRef>;

    /// Create a page in a container
    fn create_page(&self, container: &Container, page: NewPage) -> StoreResult<PageRef>;
}
