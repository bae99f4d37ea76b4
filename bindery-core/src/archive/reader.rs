//! Safe extraction of importable entries from a ZIP archive

use super::normalize_entry_name;
use crate::error::{ArchiveError, ImportError, PolicyViolation};
use crate::types::upload::extension_of;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Entry contents keyed by normalized relative path
pub type ArchiveEntries = BTreeMap<String, Vec<u8>>;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Reads importable text entries out of a ZIP archive.
///
/// Unsafe entry names are skipped, never written anywhere: content is read
/// straight into memory. The sum of declared entry sizes is checked against
/// a budget before each entry is read.
#[derive(Debug, Clone)]
pub struct ZipContentReader {
    extensions: Vec<String>,
}

impl Default for ZipContentReader {
    fn default() -> Self {
        Self {
            extensions: MARKDOWN_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ZipContentReader {
    /// Reader that admits Markdown entries only
    pub fn new() -> Self {
        Self::default()
    }

    /// Also admit `.html`/`.htm` entries
    pub fn with_html_entries(mut self, enabled: bool) -> Self {
        if enabled {
            for ext in HTML_EXTENSIONS {
                if !self.extensions.iter().any(|e| e == ext) {
                    self.extensions.push(ext.to_string());
                }
            }
        } else {
            self.extensions.retain(|e| !HTML_EXTENSIONS.contains(&e.as_str()));
        }
        self
    }

    /// Whether an entry with this normalized name would be read
    pub fn accepts(&self, name: &str) -> bool {
        extension_of(name).is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Open and read an archive from disk
    pub fn read(&self, path: &Path, max_total_bytes: u64) -> Result<ArchiveEntries, ImportError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ArchiveError::NotFound,
            _ => ArchiveError::Open(format!("{}: {}", path.display(), e)),
        })?;
        self.read_from(BufReader::new(file), max_total_bytes)
    }

    /// Read an archive from any seekable source
    pub fn read_from<R: Read + Seek>(
        &self,
        reader: R,
        max_total_bytes: u64,
    ) -> Result<ArchiveEntries, ImportError> {
        let mut archive = ZipArchive::new(reader).map_err(ArchiveError::from)?;
        let mut entries = ArchiveEntries::new();
        let mut total: u64 = 0;

        for index in 0..archive.len() {
            let mut file = match archive.by_index(index) {
                Ok(file) => file,
                Err(e) => {
                    debug!(index, error = %e, "Skipping unreadable archive entry");
                    continue;
                }
            };

            if file.name_raw().contains(&0) {
                debug!(index, "Skipping archive entry with NUL byte in name");
                continue;
            }

            let name = match normalize_entry_name(file.name()) {
                Ok(name) => name,
                Err(reason) => {
                    debug!(entry = %file.name(), ?reason, "Skipping archive entry");
                    continue;
                }
            };

            if file.is_dir() || !self.accepts(&name) {
                continue;
            }

            let size = file.size();
            total = total.saturating_add(size);
            if total > max_total_bytes {
                return Err(PolicyViolation::ArchiveTooLarge {
                    limit_bytes: max_total_bytes,
                }
                .into());
            }

            let mut content = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
            match file.by_ref().take(size.saturating_add(1)).read_to_end(&mut content) {
                Ok(_) if content.len() as u64 <= size => {
                    debug!(entry = %name, bytes = content.len(), "Read archive entry");
                    entries.insert(name, content);
                }
                Ok(_) => {
                    debug!(entry = %name, declared = size, "Skipping entry larger than declared");
                }
                Err(e) => {
                    debug!(entry = %name, error = %e, "Skipping unreadable archive entry");
                }
            }
        }

        Ok(entries)
    }
}
