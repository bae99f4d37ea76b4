//! Deterministic ordering and chapter assignment for archive entries

use crate::types::PlanItem;

/// Orders archive paths and decides which chapter each one lands in
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPathPlanner;

impl ZipPathPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plan the import of `paths`.
    ///
    /// Paths are normalized the same way the reader normalizes entry names
    /// and empty results are dropped. The rest are sorted case-insensitively
    /// with the raw path as tie-breaker. With `create_chapters` set, the first
    /// segment of a nested path names its chapter, verbatim; top-level files
    /// and everything when unset go to the book root.
    pub fn plan<I, S>(&self, paths: I, create_chapters: bool) -> Vec<PlanItem>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = paths
            .into_iter()
            .map(|p| normalize_path(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();

        normalized.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });

        normalized
            .into_iter()
            .map(|path| {
                let chapter = create_chapters
                    .then(|| chapter_of(&path))
                    .flatten();
                PlanItem { path, chapter }
            })
            .collect()
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut rest = path.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped.trim_start_matches('/');
    }
    rest.to_string()
}

fn chapter_of(path: &str) -> Option<String> {
    let (first, _) = path.split_once('/')?;
    (!first.is_empty()).then(|| first.to_string())
}
