//! Import configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Settings recognized by the importer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Cap for each uploaded item and for the extracted contents of an archive
    pub max_upload_size_mb: u64,

    /// Accept ZIP uploads at all
    pub allow_archives: bool,

    /// Default for `ImportOptions::create_chapters_from_folders`
    pub create_chapters_from_folders_default: bool,

    /// Also extract `.html`/`.htm` entries from archives
    pub include_html_in_archives: bool,

    /// Parent directory for staged uploads (system temp dir when unset)
    pub staging_dir: Option<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_upload_size_mb: 20,
            allow_archives: true,
            create_chapters_from_folders_default: true,
            include_html_in_archives: false,
            staging_dir: None,
        }
    }
}

impl ImportConfig {
    /// Build a configuration from `BINDERY_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup, keeping defaults
    /// for missing or unparsable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_upload_size_mb = lookup("BINDERY_MAX_UPLOAD_MB")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.max_upload_size_mb);

        Self {
            max_upload_size_mb,
            allow_archives: lookup("BINDERY_ALLOW_ARCHIVES")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.allow_archives),
            create_chapters_from_folders_default: lookup("BINDERY_CREATE_CHAPTERS_DEFAULT")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.create_chapters_from_folders_default),
            include_html_in_archives: lookup("BINDERY_ARCHIVE_HTML")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.include_html_in_archives),
            staging_dir: lookup("BINDERY_STAGING_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Byte limit derived from `max_upload_size_mb` (never below 1 MB)
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb.max(1).saturating_mul(BYTES_PER_MB)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
