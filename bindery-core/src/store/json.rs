//! JSON-file-backed library

use super::{ContentStore, Library, MemoryStore, StoreResult};
use crate::error::PersistenceError;
use crate::types::{BookRef, ChapterRef, Container, NewPage, PageRef};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A [`MemoryStore`] that loads from and saves to a JSON file
#[derive(Debug)]
pub struct JsonLibrary {
    path: PathBuf,
    store: MemoryStore,
}

impl JsonLibrary {
    /// Load a library; a missing file yields an empty library
    pub fn load(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let library = match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).map_err(|e| {
                PersistenceError::Backend(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Library::default(),
            Err(e) => {
                return Err(PersistenceError::Backend(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            store: MemoryStore::from_library(library),
        })
    }

    /// Save the library atomically.
    /// Writes to a temp file next to the target, then renames over it.
    pub fn save(&self) -> StoreResult<()> {
        let data = serde_json::to_string_pretty(&self.store.snapshot())
            .map_err(|e| PersistenceError::Backend(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| PersistenceError::Backend(e.to_string()))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, data).map_err(|e| PersistenceError::Backend(e.to_string()))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| PersistenceError::Backend(e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying in-memory store
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Find a book by name, creating it when absent
    pub fn find_or_create_book(&self, name: &str) -> BookRef {
        self.store
            .find_book_by_name(name)
            .unwrap_or_else(|| self.store.create_book(name))
    }
}

impl ContentStore for JsonLibrary {
    fn find_book(&self, id: Uuid) -> StoreResult<BookRef> {
        self.store.find_book(id)
    }

    fn list_chapters(&self, book: &BookRef) -> StoreResult<Vec<ChapterRef>> {
        self.store.list_chapters(book)
    }

    fn list_page_names(&self, container: &Container) -> StoreResult<Vec<String>> {
        self.store.list_page_names(container)
    }

    fn create_chapter(&self, book: &BookRef, name: &str) -> StoreResult<ChapterRef> {
        self.store.create_chapter(book, name)
    }

    fn create_page(&self, container: &Container, page: NewPage) -> StoreResult<PageRef> {
        self.store.create_page(container, page)
    }
}
