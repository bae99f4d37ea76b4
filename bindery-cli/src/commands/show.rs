//! Show command implementation

use anyhow::{Context, Result};
use bindery_core::store::{BookRecord, JsonLibrary};
use serde::Serialize;
use std::path::Path;

/// Book outline output
#[derive(Serialize)]
struct BookOutline {
    id: String,
    name: String,
    pages: Vec<String>,
    chapters: Vec<ChapterOutline>,
    total_pages: usize,
}

#[derive(Serialize)]
struct ChapterOutline {
    name: String,
    pages: Vec<String>,
}

impl From<&BookRecord> for BookOutline {
    fn from(book: &BookRecord) -> Self {
        Self {
            id: book.id.to_string(),
            name: book.name.clone(),
            pages: book.pages.iter().map(|p| p.name.clone()).collect(),
            chapters: book
                .chapters
                .iter()
                .map(|c| ChapterOutline {
                    name: c.name.clone(),
                    pages: c.pages.iter().map(|p| p.name.clone()).collect(),
                })
                .collect(),
            total_pages: book.page_count(),
        }
    }
}

/// Display the books, chapters and pages of a library
pub fn show(library: &str, json: bool) -> Result<()> {
    if !Path::new(library).exists() {
        anyhow::bail!("Library not found: {}", library);
    }

    let snapshot = JsonLibrary::load(library)
        .with_context(|| format!("Failed to load library: {}", library))?
        .store()
        .snapshot();

    if json {
        let outline: Vec<BookOutline> = snapshot.books.iter().map(BookOutline::from).collect();
        println!("{}", serde_json::to_string_pretty(&outline)?);
        return Ok(());
    }

    if snapshot.books.is_empty() {
        println!("Library is empty");
        return Ok(());
    }

    for book in &snapshot.books {
        println!("{} ({} pages)", book.name, book.page_count());
        for page in &book.pages {
            println!("  - {}", page.name);
        }
        for chapter in &book.chapters {
            println!("  [{}]", chapter.name);
            for page in &chapter.pages {
                println!("    - {}", page.name);
            }
        }
    }

    Ok(())
}
