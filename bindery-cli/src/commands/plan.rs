//! Plan command implementation

use anyhow::{Context, Result};
use bindery_core::archive::{ZipContentReader, ZipPathPlanner};
use bindery_core::ImportConfig;
use std::path::Path;

/// Print the import plan of an archive without touching any library
pub fn plan(archive: &str, create_chapters: bool, archive_html: bool, json: bool) -> Result<()> {
    let config = ImportConfig::from_env();
    let reader = ZipContentReader::new()
        .with_html_entries(archive_html || config.include_html_in_archives);

    let entries = reader
        .read(Path::new(archive), config.max_upload_bytes())
        .with_context(|| format!("Failed to read archive: {}", archive))?;

    let plan = ZipPathPlanner::new().plan(entries.keys(), create_chapters);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if plan.is_empty() {
        println!("No importable files found in {}", archive);
        return Ok(());
    }

    for item in &plan {
        match &item.chapter {
            Some(chapter) => println!("{} -> {}", item.path, chapter),
            None => println!("{} -> (book root)", item.path),
        }
    }

    Ok(())
}
