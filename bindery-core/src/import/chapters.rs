//! Chapters of the target book, keyed by lowercased name

use crate::error::PersistenceError;
use crate::store::ContentStore;
use crate::types::{BookRef, ChapterRef};
use std::collections::HashMap;

/// Known chapters of one book for the duration of an import call
#[derive(Debug, Clone, Default)]
pub struct ChapterMap {
    by_name: HashMap<String, ChapterRef>,
}

impl ChapterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the chapters the book already has.
    ///
    /// When two existing chapters differ only by case, the first listed wins.
    pub fn load(store: &dyn ContentStore, book: &BookRef) -> Result<Self, PersistenceError> {
        let mut map = Self::new();
        for chapter in store.list_chapters(book)? {
            map.by_name
                .entry(chapter.name.to_lowercase())
                .or_insert(chapter);
        }
        Ok(map)
    }

    pub fn get(&self, name: &str) -> Option<&ChapterRef> {
        self.by_name.get(&name.to_lowercase())
    }

    /// Register `chapter` under the folder name that produced it
    pub fn insert(&mut self, folder: &str, chapter: ChapterRef) {
        self.by_name.insert(folder.to_lowercase(), chapter);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
