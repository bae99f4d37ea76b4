//! Aggregate outcome of one import call

use serde::{Deserialize, Serialize};

/// Counts and failures accumulated across a whole batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Pages successfully created
    pub pages_created: usize,

    /// Chapters successfully created
    pub chapters_created: usize,

    /// Ordered "label: message" entries, one per item that could not be imported
    pub failures: Vec<String>,
}

impl ImportResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for the given item label
    pub fn add_failure(&mut self, label: &str, message: impl AsRef<str>) {
        self.failures.push(format!("{}: {}", label, message.as_ref()));
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One-line success message
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} page(s) created", self.pages_created)];
        if self.chapters_created > 0 {
            parts.push(format!("{} chapter(s) created", self.chapters_created));
        }
        format!("Import complete: {}.", parts.join(", "))
    }

    /// The first `limit` failures joined for display, or None when nothing failed
    pub fn failure_preview(&self, limit: usize) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }

        let shown: Vec<&str> = self
            .failures
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect();
        let suffix = if self.failures.len() > limit {
            " and more."
        } else {
            "."
        };
        Some(format!(
            "Some files failed to import: {}{}",
            shown.join("; "),
            suffix
        ))
    }
}
