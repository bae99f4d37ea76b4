//! Uploaded items and per-call import options

use crate::config::ImportConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Label used for uploads that arrive without a file name
pub const UNNAMED_UPLOAD: &str = "Uploaded file";

/// One file handed to the importer by the transport layer
#[derive(Debug, Clone)]
pub struct UploadedItem {
    /// Raw file content
    pub bytes: Vec<u8>,

    /// File name as supplied by the client
    pub original_name: String,

    /// Extension declared by the client, if any
    pub declared_extension: Option<String>,

    /// MIME type declared by the client, if any
    pub content_type: Option<String>,
}

impl UploadedItem {
    /// Create an item, taking the declared extension from the file name
    pub fn new(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let original_name = original_name.into();
        let declared_extension = extension_of(&original_name);
        Self {
            bytes,
            original_name,
            declared_extension,
            content_type: None,
        }
    }

    /// Set the declared MIME type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Override the declared extension
    pub fn with_declared_extension(mut self, extension: Option<String>) -> Self {
        self.declared_extension = extension;
        self
    }

    /// Label used in failure messages and logs
    pub fn display_name(&self) -> &str {
        if self.original_name.trim().is_empty() {
            UNNAMED_UPLOAD
        } else {
            &self.original_name
        }
    }

    /// Lowercase extension: declared first, then sniffed, then taken from the name
    pub fn detect_extension(&self) -> String {
        if let Some(ext) = self.declared_extension.as_deref() {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() {
                return ext;
            }
        }

        if let Some(ext) = self.sniff_extension() {
            return ext.to_string();
        }

        extension_of(&self.original_name).unwrap_or_default()
    }

    /// Guess an extension from the declared MIME type, then from magic bytes
    fn sniff_extension(&self) -> Option<&'static str> {
        if let Some(mime) = self.content_type.as_deref() {
            let essence = mime
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_lowercase();
            match essence.as_str() {
                "text/markdown" | "text/x-markdown" => return Some("md"),
                "text/html" | "application/xhtml+xml" => return Some("html"),
                "application/zip" | "application/x-zip-compressed" => return Some("zip"),
                _ => {}
            }
        }

        if self.bytes.starts_with(b"PK\x03\x04") || self.bytes.starts_with(b"PK\x05\x06") {
            return Some("zip");
        }

        let head = String::from_utf8_lossy(&self.bytes[..self.bytes.len().min(512)]);
        let head = head.trim_start_matches('\u{feff}').trim_start().to_lowercase();
        if head.starts_with("<!doctype html") || head.starts_with("<html") {
            return Some("html");
        }

        None
    }

    /// Classify this item by its detected extension
    pub fn kind(&self) -> ItemKind {
        ItemKind::from_extension(&self.detect_extension())
    }
}

/// Lowercase extension of the last path segment of `name`
pub(crate) fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty())
}

/// What kind of content an item holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Markdown,
    Html,
    Zip,
    Unsupported,
}

impl ItemKind {
    /// Map a file extension onto a kind (case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "md" | "markdown" | "mdown" | "mkd" => ItemKind::Markdown,
            "html" | "htm" => ItemKind::Html,
            "zip" => ItemKind::Zip,
            _ => ItemKind::Unsupported,
        }
    }
}

/// Options fixed for the duration of one import call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Turn top-level archive folders into chapters
    pub create_chapters_from_folders: bool,
}

impl ImportOptions {
    pub fn new(create_chapters_from_folders: bool) -> Self {
        Self {
            create_chapters_from_folders,
        }
    }

    /// Options carrying the configured defaults
    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.create_chapters_from_folders_default)
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

/// One archive entry scheduled for import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    /// Normalized entry path
    pub path: String,

    /// Chapter the entry is grouped under, if any
    pub chapter: Option<String>,
}
