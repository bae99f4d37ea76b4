//! Import command implementation

use anyhow::{Context, Result};
use bindery_core::{ImportConfig, ImportOptions, Importer, JsonLibrary, UploadedItem};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Most failures listed in the human-readable summary
const FAILURE_PREVIEW_LIMIT: usize = 6;

/// Arguments of the `import` subcommand
pub struct ImportArgs {
    pub files: Vec<String>,
    pub library: String,
    pub book: String,
    /// Explicit chapter grouping; None keeps the configured default
    pub chapters: Option<bool>,
    pub max_upload_mb: Option<u64>,
    pub no_archives: bool,
    pub archive_html: bool,
    pub json: bool,
}

/// Import files into a book of a JSON library
pub fn import(args: ImportArgs) -> Result<()> {
    let mut config = ImportConfig::from_env();
    if let Some(mb) = args.max_upload_mb {
        config.max_upload_size_mb = mb;
    }
    if args.no_archives {
        config.allow_archives = false;
    }
    if args.archive_html {
        config.include_html_in_archives = true;
    }

    let options = match args.chapters {
        Some(enabled) => ImportOptions::new(enabled),
        None => ImportOptions::from_config(&config),
    };

    let items = args
        .files
        .iter()
        .map(|file| load_item(Path::new(file)))
        .collect::<Result<Vec<_>>>()?;

    let library = JsonLibrary::load(&args.library)
        .with_context(|| format!("Failed to load library: {}", args.library))?;
    let book = library.find_or_create_book(&args.book);

    let pb = if args.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Importing {} file(s) into '{}'...", items.len(), book.name));

    let result = Importer::new(&library, config)
        .import_files(&book, &items, options)
        .with_context(|| format!("Failed to import into '{}'", book.name))?;

    pb.set_message("Saving library...");
    library
        .save()
        .with_context(|| format!("Failed to save library: {}", args.library))?;
    pb.finish_and_clear();

    tracing::info!(
        "Imported {} page(s) into '{}' ({} failure(s))",
        result.pages_created,
        book.name,
        result.failures.len()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.summary());
        if let Some(preview) = result.failure_preview(FAILURE_PREVIEW_LIMIT) {
            println!("{}", preview);
        }
    }

    Ok(())
}

fn load_item(path: &Path) -> Result<UploadedItem> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(UploadedItem::new(name, bytes))
}
