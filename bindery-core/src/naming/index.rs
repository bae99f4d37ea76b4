//! Per-call cache of existing page and chapter names

use super::NameCollisionResolver;
use crate::error::PersistenceError;
use crate::store::ContentStore;
use crate::types::{BookRef, Container, ContainerKey};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Lowercased names per container (pages) and per book (chapters).
///
/// Each set is loaded from the store on first query and kept current as
/// names are accepted, so items created earlier in the same call count as
/// collisions even before the store would report them.
#[derive(Debug, Default)]
pub struct ContainerNameIndex {
    pages: HashMap<ContainerKey, HashSet<String>>,
    pages_loaded: HashSet<ContainerKey>,
    chapters: HashMap<Uuid, HashSet<String>>,
    chapters_loaded: HashSet<Uuid>,
    resolver: NameCollisionResolver,
}

impl ContainerNameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a page named `name` already exists in `container`
    pub fn page_name_exists(
        &mut self,
        store: &dyn ContentStore,
        container: &Container,
        name: &str,
    ) -> Result<bool, PersistenceError> {
        self.ensure_pages_loaded(store, container)?;
        Ok(self
            .pages
            .get(&container.key())
            .is_some_and(|names| names.contains(&name.to_lowercase())))
    }

    /// Record an accepted page name
    pub fn add_page_name(&mut self, container: &Container, name: &str) {
        self.pages
            .entry(container.key())
            .or_default()
            .insert(name.to_lowercase());
    }

    /// Whether a chapter named `name` already exists in `book`
    pub fn chapter_name_exists(
        &mut self,
        store: &dyn ContentStore,
        book: &BookRef,
        name: &str,
    ) -> Result<bool, PersistenceError> {
        self.ensure_chapters_loaded(store, book)?;
        Ok(self
            .chapters
            .get(&book.id)
            .is_some_and(|names| names.contains(&name.to_lowercase())))
    }

    /// Record an accepted chapter name
    pub fn add_chapter_name(&mut self, book_id: Uuid, name: &str) {
        self.chapters
            .entry(book_id)
            .or_default()
            .insert(name.to_lowercase());
    }

    /// Resolve a page name that is free in `container`
    pub fn unique_page_name(
        &mut self,
        store: &dyn ContentStore,
        container: &Container,
        desired: &str,
    ) -> Result<String, PersistenceError> {
        self.ensure_pages_loaded(store, container)?;
        let names = self.pages.get(&container.key());
        Ok(self.resolver.resolve(desired, |candidate| {
            names.is_some_and(|n| n.contains(&candidate.to_lowercase()))
        }))
    }

    /// Resolve a chapter name that is free in `book`
    pub fn unique_chapter_name(
        &mut self,
        store: &dyn ContentStore,
        book: &BookRef,
        desired: &str,
    ) -> Result<String, PersistenceError> {
        self.ensure_chapters_loaded(store, book)?;
        let names = self.chapters.get(&book.id);
        Ok(self.resolver.resolve(desired, |candidate| {
            names.is_some_and(|n| n.contains(&candidate.to_lowercase()))
        }))
    }

    fn ensure_pages_loaded(
        &mut self,
        store: &dyn ContentStore,
        container: &Container,
    ) -> Result<(), PersistenceError> {
        let key = container.key();
        if self.pages_loaded.contains(&key) {
            return Ok(());
        }

        let existing = store.list_page_names(container)?;
        self.pages
            .entry(key)
            .or_default()
            .extend(existing.iter().map(|n| n.to_lowercase()));
        self.pages_loaded.insert(key);
        Ok(())
    }

    fn ensure_chapters_loaded(
        &mut self,
        store: &dyn ContentStore,
        book: &BookRef,
    ) -> Result<(), PersistenceError> {
        if self.chapters_loaded.contains(&book.id) {
            return Ok(());
        }

        let existing = store.list_chapter_names(book)?;
        self.chapters
            .entry(book.id)
            .or_default()
            .extend(existing.iter().map(|n| n.to_lowercase()));
        self.chapters_loaded.insert(book.id);
        Ok(())
    }
}
