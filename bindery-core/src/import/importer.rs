//! The batch importer

use super::ChapterMap;
use crate::archive::{ZipContentReader, ZipPathPlanner};
use crate::config::ImportConfig;
use crate::error::{ImportError, PolicyViolation, Result};
use crate::html::HtmlSanitizer;
use crate::naming::{ContainerNameIndex, FALLBACK_NAME};
use crate::render::{CommonMarkRenderer, MarkdownRenderer};
use crate::staging::StagingArea;
use crate::store::ContentStore;
use crate::title::{HtmlTitleExtractor, MarkdownTitleExtractor};
use crate::types::upload::extension_of;
use crate::types::{
    BookRef, ChapterRef, Container, ImportOptions, ImportResult, ItemKind, NewPage, PageRef,
    UploadedItem,
};
use std::path::Path;

/// Summary stored on every imported page
pub const DEFAULT_PAGE_SUMMARY: &str = "Imported from file";

/// State that lives for exactly one import call
struct ImportSession {
    book: BookRef,
    names: ContainerNameIndex,
    chapters: ChapterMap,
    result: ImportResult,
}

/// Imports batches of Markdown, HTML and ZIP uploads into a book.
///
/// One bad item never aborts the batch: every failure is recorded in the
/// returned [`ImportResult`] and the remaining items are still processed.
pub struct Importer<'a> {
    store: &'a dyn ContentStore,
    config: ImportConfig,
    renderer: Box<dyn MarkdownRenderer + 'a>,
    sanitizer: HtmlSanitizer,
    markdown_titles: MarkdownTitleExtractor,
    html_titles: HtmlTitleExtractor,
    reader: ZipContentReader,
    planner: ZipPathPlanner,
    staging: StagingArea,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a dyn ContentStore, config: ImportConfig) -> Self {
        Self {
            store,
            reader: ZipContentReader::new().with_html_entries(config.include_html_in_archives),
            staging: StagingArea::new(config.staging_dir.clone()),
            config,
            renderer: Box::new(CommonMarkRenderer::new()),
            sanitizer: HtmlSanitizer::new(),
            markdown_titles: MarkdownTitleExtractor::new(),
            html_titles: HtmlTitleExtractor::new(),
            planner: ZipPathPlanner::new(),
        }
    }

    /// Use a different Markdown renderer
    pub fn with_renderer(mut self, renderer: impl MarkdownRenderer + 'a) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Use a differently configured sanitizer
    pub fn with_sanitizer(mut self, sanitizer: HtmlSanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import a single item
    pub fn import(
        &self,
        book: &BookRef,
        item: &UploadedItem,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        self.import_files(book, std::slice::from_ref(item), options)
    }

    /// Import every item into `book`, in order.
    ///
    /// Errors are returned only when the book itself cannot be used; item
    /// and entry failures end up in [`ImportResult::failures`].
    pub fn import_files(
        &self,
        book: &BookRef,
        items: &[UploadedItem],
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let book = self
            .store
            .find_book(book.id)
            .map_err(|e| ImportError::InvalidRoot(e.to_string()))?;

        let mut session = ImportSession {
            chapters: ChapterMap::load(self.store, &book)?,
            names: ContainerNameIndex::new(),
            result: ImportResult::new(),
            book,
        };

        for item in items {
            let label = item.display_name();
            if let Err(e) = self.import_item(&mut session, item, options) {
                tracing::warn!(
                    name = %label,
                    book_id = %session.book.id,
                    error = %e,
                    "Import failed"
                );
                session.result.add_failure(label, e.to_string());
            }
        }

        tracing::info!(
            book_id = %session.book.id,
            items = items.len(),
            pages_created = session.result.pages_created,
            chapters_created = session.result.chapters_created,
            failures = session.result.failures.len(),
            "Import finished"
        );

        Ok(session.result)
    }

    fn import_item(
        &self,
        session: &mut ImportSession,
        item: &UploadedItem,
        options: ImportOptions,
    ) -> Result<()> {
        let name = item.display_name();

        let limit = self.config.max_upload_bytes();
        if item.bytes.len() as u64 > limit {
            return Err(PolicyViolation::UploadTooLarge {
                name: name.to_string(),
                limit_mb: self.config.max_upload_size_mb.max(1),
            }
            .into());
        }

        let extension = item.detect_extension();
        let kind = ItemKind::from_extension(&extension);
        match kind {
            ItemKind::Unsupported => {
                return Err(PolicyViolation::UnsupportedType {
                    name: name.to_string(),
                    extension,
                }
                .into())
            }
            ItemKind::Zip if !self.config.allow_archives => {
                return Err(PolicyViolation::ArchivesDisabled {
                    name: name.to_string(),
                }
                .into())
            }
            _ => {}
        }

        let staged = self.staging.stage(&item.bytes, &extension)?;
        let root = Container::Root(session.book.clone());

        match kind {
            ItemKind::Zip => self.import_archive(session, staged.path(), options),
            ItemKind::Html => {
                let text = normalize_text(&staged.read()?);
                self.import_html(session, &root, name, &text).map(|_| ())
            }
            _ => {
                let text = normalize_text(&staged.read()?);
                self.import_markdown(session, &root, name, &text).map(|_| ())
            }
        }
    }

    fn import_archive(
        &self,
        session: &mut ImportSession,
        archive: &Path,
        options: ImportOptions,
    ) -> Result<()> {
        let entries = self.reader.read(archive, self.config.max_upload_bytes())?;
        if entries.is_empty() {
            return Err(PolicyViolation::EmptyArchive.into());
        }

        let plan = self
            .planner
            .plan(entries.keys(), options.create_chapters_from_folders);

        for item in plan {
            let Some(content) = entries.get(&item.path) else {
                continue;
            };

            let outcome = self
                .container_for(session, item.chapter.as_deref())
                .and_then(|container| {
                    let text = normalize_text(content);
                    match extension_of(&item.path).as_deref() {
                        Some("html" | "htm") => {
                            self.import_html(session, &container, &item.path, &text)
                        }
                        _ => self.import_markdown(session, &container, &item.path, &text),
                    }
                });

            if let Err(e) = outcome {
                tracing::warn!(
                    path = %item.path,
                    book_id = %session.book.id,
                    error = %e,
                    "Archive entry failed"
                );
                session.result.add_failure(&item.path, e.to_string());
            }
        }

        Ok(())
    }

    fn container_for(&self, session: &mut ImportSession, chapter: Option<&str>) -> Result<Container> {
        match chapter {
            Some(name) => Ok(Container::Chapter(self.chapter_for(session, name)?)),
            None => Ok(Container::Root(session.book.clone())),
        }
    }

    /// Existing chapter for `folder`, or a new one with a collision-free name
    fn chapter_for(&self, session: &mut ImportSession, folder: &str) -> Result<ChapterRef> {
        if let Some(chapter) = session.chapters.get(folder) {
            return Ok(chapter.clone());
        }

        let name = session
            .names
            .unique_chapter_name(self.store, &session.book, folder)?;
        let chapter = self.store.create_chapter(&session.book, &name)?;
        session.names.add_chapter_name(session.book.id, &chapter.name);
        session.chapters.insert(folder, chapter.clone());
        session.result.chapters_created += 1;

        tracing::debug!(chapter = %chapter.name, folder = %folder, "Created chapter");
        Ok(chapter)
    }

    fn import_markdown(
        &self,
        session: &mut ImportSession,
        container: &Container,
        source: &str,
        markdown: &str,
    ) -> Result<PageRef> {
        let extracted = self.markdown_titles.extract(markdown);
        let title = extracted.title.unwrap_or_else(|| default_title(source));
        let html = self.renderer.render(&extracted.markdown)?;
        let html = self.sanitizer.sanitize(&html);
        self.create_page(session, container, &title, html)
    }

    fn import_html(
        &self,
        session: &mut ImportSession,
        container: &Container,
        source: &str,
        html: &str,
    ) -> Result<PageRef> {
        let sanitized = self.sanitizer.sanitize(html);
        let extracted = self.html_titles.extract(&sanitized);
        let title = extracted.title.unwrap_or_else(|| default_title(source));
        self.create_page(session, container, &title, extracted.html)
    }

    fn create_page(
        &self,
        session: &mut ImportSession,
        container: &Container,
        title: &str,
        html: String,
    ) -> Result<PageRef> {
        let name = session
            .names
            .unique_page_name(self.store, container, title)?;
        let page = self.store.create_page(
            container,
            NewPage {
                name,
                html,
                summary: DEFAULT_PAGE_SUMMARY.to_string(),
            },
        )?;
        session.names.add_page_name(container, &page.name);
        session.result.pages_created += 1;

        tracing::debug!(page = %page.name, container = %container.name(), "Created page");
        Ok(page)
    }
}

/// Decode as UTF-8 (lossily), drop a leading BOM and normalize line endings
fn normalize_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// File stem of the last path segment, or the fallback name
fn default_title(source: &str) -> String {
    let normalized = source.replace('\\', "/");
    Path::new(&normalized)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(b"\xef\xbb\xbfa\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_text(b"ok \xff"), "ok \u{fffd}");
    }

    #[test]
    fn test_default_title() {
        assert_eq!(default_title("folder/Release Notes.md"), "Release Notes");
        assert_eq!(default_title("dir\\page.html"), "page");
        assert_eq!(default_title(".md"), ".md");
        assert_eq!(default_title(""), "Untitled");
    }

    #[test]
    fn test_single_markdown_item() {
        let store = MemoryStore::new();
        let book = store.create_book("Guide");
        let importer = Importer::new(&store, ImportConfig::default());

        let item = UploadedItem::new("intro.md", b"# Welcome\n\nHello **there**".to_vec());
        let result = importer
            .import(&book, &item, ImportOptions::default())
            .unwrap();

        assert_eq!(result.pages_created, 1);
        assert!(result.failures.is_empty());

        let record = store.book_record(book.id).unwrap();
        assert_eq!(record.pages[0].name, "Welcome");
        assert_eq!(record.pages[0].html, "<p>Hello <strong>there</strong></p>\n");
        assert_eq!(record.pages[0].summary, DEFAULT_PAGE_SUMMARY);
    }

    struct FailingRenderer;

    impl MarkdownRenderer for FailingRenderer {
        fn render(&self, markdown: &str) -> std::result::Result<String, crate::ContentError> {
            if markdown.contains("boom") {
                return Err(crate::ContentError::Render("unbalanced input".to_string()));
            }
            Ok(format!("<p>{}</p>", markdown.trim()))
        }
    }

    #[test]
    fn test_render_failure_is_isolated() {
        let store = MemoryStore::new();
        let book = store.create_book("Guide");
        let importer =
            Importer::new(&store, ImportConfig::default()).with_renderer(FailingRenderer);

        let items = [
            UploadedItem::new("bad.md", b"boom".to_vec()),
            UploadedItem::new("good.md", b"fine".to_vec()),
        ];
        let result = importer
            .import_files(&book, &items, ImportOptions::default())
            .unwrap();

        assert_eq!(result.pages_created, 1);
        assert_eq!(
            result.failures,
            vec!["bad.md: Markdown rendering failed: unbalanced input"]
        );
        assert_eq!(store.book_record(book.id).unwrap().pages[0].html, "<p>fine</p>");
    }

    #[test]
    fn test_unknown_book_is_rejected() {
        let store = MemoryStore::new();
        let importer = Importer::new(&store, ImportConfig::default());

        let err = importer
            .import_files(&BookRef::new("Ghost"), &[], ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidRoot(_)));
    }
}
