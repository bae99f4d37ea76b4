//! Books, chapters and the containers pages are attached to

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle to the root book targeted by an import
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookRef {
    pub id: Uuid,
    pub name: String,
}

impl BookRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Handle to a chapter; always a direct child of exactly one book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterRef {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
}

/// Handle to a page created by a store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRef {
    pub id: Uuid,
    pub book_id: Uuid,
    pub chapter_id: Option<Uuid>,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Page payload handed to a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    pub name: String,
    pub html: String,
    pub summary: String,
}

/// Identity of a container for name indexing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKey {
    Book(Uuid),
    Chapter(Uuid),
}

/// Where a page is attached: the book itself or one of its chapters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Root(BookRef),
    Chapter(ChapterRef),
}

impl Container {
    /// Identity key used by the name index
    pub fn key(&self) -> ContainerKey {
        match self {
            Container::Root(book) => ContainerKey::Book(book.id),
            Container::Chapter(chapter) => ContainerKey::Chapter(chapter.id),
        }
    }

    /// The book whose chapter names this container is checked against
    pub fn book_id(&self) -> Uuid {
        match self {
            Container::Root(book) => book.id,
            Container::Chapter(chapter) => chapter.book_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Container::Root(book) => &book.name,
            Container::Chapter(chapter) => &chapter.name,
        }
    }
}

impl From<BookRef> for Container {
    fn from(book: BookRef) -> Self {
        Container::Root(book)
    }
}

impl From<ChapterRef> for Container {
    fn from(chapter: ChapterRef) -> Self {
        Container::Chapter(chapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_keys() {
        let book = BookRef::new("Handbook");
        let chapter = ChapterRef {
            id: Uuid::new_v4(),
            book_id: book.id,
            name: "Setup".to_string(),
        };

        let root = Container::from(book.clone());
        let nested = Container::from(chapter.clone());

        assert_eq!(root.key(), ContainerKey::Book(book.id));
        assert_eq!(nested.key(), ContainerKey::Chapter(chapter.id));
        assert_eq!(nested.book_id(), book.id);
        assert_ne!(root.key(), nested.key());
    }
}
