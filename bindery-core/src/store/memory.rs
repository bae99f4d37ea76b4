//! In-memory content store

use super::{ContentStore, StoreResult};
use crate::error::PersistenceError;
use crate::types::{BookRef, ChapterRef, Container, NewPage, PageRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Serializable snapshot of every book in a store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub books: Vec<BookRecord>,
}

/// A book with its chapters and root-level pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub chapters: Vec<ChapterRecord>,
    #[serde(default)]
    pub pages: Vec<PageRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub pages: Vec<PageRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: Uuid,
    pub name: String,
    pub html: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl BookRecord {
    fn to_ref(&self) -> BookRef {
        BookRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    fn chapter_mut(&mut self, id: Uuid) -> StoreResult<&mut ChapterRecord> {
        self.chapters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PersistenceError::ChapterNotFound(id.to_string()))
    }

    /// Pages directly inside the book, then pages of every chapter
    pub fn page_count(&self) -> usize {
        self.pages.len() + self.chapters.iter().map(|c| c.pages.len()).sum::<usize>()
    }
}

impl Library {
    fn book(&self, id: Uuid) -> StoreResult<&BookRecord> {
        self.books
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| PersistenceError::BookNotFound(id.to_string()))
    }

    fn book_mut(&mut self, id: Uuid) -> StoreResult<&mut BookRecord> {
        self.books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| PersistenceError::BookNotFound(id.to_string()))
    }
}

/// Content store that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    library: RwLock<Library>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing library snapshot
    pub fn from_library(library: Library) -> Self {
        Self {
            library: RwLock::new(library),
        }
    }

    // Poisoning is ignored: every write is a single push.
    fn read(&self) -> RwLockReadGuard<'_, Library> {
        self.library.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Library> {
        self.library.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Create an empty book
    pub fn create_book(&self, name: &str) -> BookRef {
        let record = BookRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            chapters: Vec::new(),
            pages: Vec::new(),
        };
        let book = record.to_ref();
        self.write().books.push(record);
        book
    }

    /// First book whose name matches case-insensitively
    pub fn find_book_by_name(&self, name: &str) -> Option<BookRef> {
        let wanted = name.to_lowercase();
        self.read()
            .books
            .iter()
            .find(|b| b.name.to_lowercase() == wanted)
            .map(BookRecord::to_ref)
    }

    /// Copy of the current library contents
    pub fn snapshot(&self) -> Library {
        self.read().clone()
    }

    /// Full record of one book
    pub fn book_record(&self, id: Uuid) -> StoreResult<BookRecord> {
        self.read().book(id).cloned()
    }
}

impl ContentStore for MemoryStore {
    fn find_book(&self, id: Uuid) -> StoreResult<BookRef> {
        self.read().book(id).map(BookRecord::to_ref)
    }

    fn list_chapters(&self, book: &BookRef) -> StoreResult<Vec<ChapterRef>> {
        let library = self.read();
        let record = library.book(book.id)?;
        Ok(record
            .chapters
            .iter()
            .map(|c| ChapterRef {
                id: c.id,
                book_id: record.id,
                name: c.name.clone(),
            })
            .collect())
    }

    fn list_page_names(&self, container: &Container) -> StoreResult<Vec<String>> {
        let library = self.read();
        let record = library.book(container.book_id())?;
        let pages = match container {
            Container::Root(_) => &record.pages,
            Container::Chapter(chapter) => {
                &record
                    .chapters
                    .iter()
                    .find(|c| c.id == chapter.id)
                    .ok_or_else(|| PersistenceError::ChapterNotFound(chapter.id.to_string()))?
                    .pages
            }
        };
        Ok(pages.iter().map(|p| p.name.clone()).collect())
    }

    fn create_chapter(&self, book: &BookRef, name: &str) -> StoreResult<ChapterRef> {
        let mut library = self.write();
        let record = library.book_mut(book.id)?;
        let chapter = ChapterRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            pages: Vec::new(),
        };
        let handle = ChapterRef {
            id: chapter.id,
            book_id: record.id,
            name: chapter.name.clone(),
        };
        record.chapters.push(chapter);
        Ok(handle)
    }

    fn create_page(&self, container: &Container, page: NewPage) -> StoreResult<PageRef> {
        let mut library = self.write();
        let record = library.book_mut(container.book_id())?;
        let page = PageRecord {
            id: Uuid::new_v4(),
            name: page.name,
            html: page.html,
            summary: page.summary,
            created_at: Utc::now(),
        };
        let handle = PageRef {
            id: page.id,
            book_id: record.id,
            chapter_id: match container {
                Container::Root(_) => None,
                Container::Chapter(chapter) => Some(chapter.id),
            },
            name: page.name.clone(),
            created_at: page.created_at,
        };

        match container {
            Container::Root(_) => record.pages.push(page),
            Container::Chapter(chapter) => record.chapter_mut(chapter.id)?.pages.push(page),
        }
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();

        let book = store.create_book("Manual");
        assert_eq!(store.find_book(book.id).unwrap(), book);
        assert_eq!(store.find_book_by_name("MANUAL"), Some(book.clone()));

        let chapter = store.create_chapter(&book, "Install").unwrap();
        assert_eq!(chapter.book_id, book.id);
        assert_eq!(store.list_chapter_names(&book).unwrap(), vec!["Install"]);

        let nested = Container::Chapter(chapter.clone());
        let page = store
            .create_page(
                &nested,
                NewPage {
                    name: "Linux".to_string(),
                    html: "<p>apt</p>".to_string(),
                    summary: "Imported".to_string(),
                },
            )
            .unwrap();
        assert_eq!(page.chapter_id, Some(chapter.id));
        assert_eq!(store.list_page_names(&nested).unwrap(), vec!["Linux"]);
        assert!(store
            .list_page_names(&Container::Root(book.clone()))
            .unwrap()
            .is_empty());

        assert_eq!(store.book_record(book.id).unwrap().page_count(), 1);
    }

    #[test]
    fn test_unknown_book() {
        let store = MemoryStore::new();
        let ghost = BookRef::new("Ghost");
        assert!(matches!(
            store.find_book(ghost.id),
            Err(PersistenceError::BookNotFound(_))
        ));
        assert!(store.create_chapter(&ghost, "x").is_err());
    }
}
