//! Sanitize command implementation

use anyhow::{bail, Context, Result};
use bindery_core::render::{CommonMarkRenderer, MarkdownRenderer};
use bindery_core::{HtmlSanitizer, ItemKind};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Print sanitized HTML for each file, in argument order
pub fn sanitize(files: &[String], jobs: usize) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to start worker pool")?;

    let renderer = CommonMarkRenderer::new();
    let sanitizer = HtmlSanitizer::new();

    let outputs: Vec<Result<String>> = pool.install(|| {
        files
            .par_iter()
            .map(|file| sanitize_file(Path::new(file), &renderer, &sanitizer))
            .collect()
    });

    for (file, output) in files.iter().zip(outputs) {
        let html = output?;
        if files.len() > 1 {
            println!("<!-- {} -->", file);
        }
        println!("{}", html.trim_end());
    }

    Ok(())
}

fn sanitize_file(
    path: &Path,
    renderer: &CommonMarkRenderer,
    sanitizer: &HtmlSanitizer,
) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .context("Could not determine input file extension")?;

    let bytes =
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let html = match ItemKind::from_extension(ext) {
        ItemKind::Markdown => renderer
            .render(&text)
            .with_context(|| format!("Failed to render {}", path.display()))?,
        ItemKind::Html => text.into_owned(),
        _ => bail!("Unsupported file type '{}': {}", ext, path.display()),
    };

    tracing::debug!("Sanitizing {:?}", path);
    Ok(sanitizer.sanitize(&html))
}
