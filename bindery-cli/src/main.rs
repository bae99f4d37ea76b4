//! Bindery CLI - Command-line interface for importing documents into a library

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse and validate jobs argument (must be at least 1)
fn parse_jobs(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("jobs must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "bindery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import Markdown, HTML and ZIP files into a book
    Import {
        /// Files to import, in order
        #[arg(required = true)]
        files: Vec<String>,

        /// Library file (created if missing)
        #[arg(short, long)]
        library: String,

        /// Target book name (created if missing)
        #[arg(short, long)]
        book: String,

        /// Keep archive folders flat instead of turning them into chapters
        #[arg(long, conflicts_with = "chapters")]
        no_chapters: bool,

        /// Turn top-level archive folders into chapters
        #[arg(long)]
        chapters: bool,

        /// Maximum size of each upload in MB
        #[arg(long)]
        max_upload_mb: Option<u64>,

        /// Reject ZIP archives
        #[arg(long)]
        no_archives: bool,

        /// Also import HTML files found inside archives
        #[arg(long)]
        archive_html: bool,

        /// Output the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how an archive would be imported, without importing it
    Plan {
        /// ZIP archive path
        archive: String,

        /// Keep archive folders flat instead of turning them into chapters
        #[arg(long)]
        no_chapters: bool,

        /// Include HTML files found inside the archive
        #[arg(long)]
        archive_html: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display the contents of a library
    Show {
        /// Library file
        #[arg(short, long)]
        library: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the sanitized HTML of Markdown or HTML files
    Sanitize {
        /// Input files
        #[arg(required = true)]
        files: Vec<String>,

        /// Number of parallel jobs (must be at least 1)
        #[arg(short, long, default_value = "4", value_parser = parse_jobs)]
        jobs: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "bindery_cli=debug,bindery_core=debug"
    } else {
        "bindery_cli=info,bindery_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Import {
            files,
            library,
            book,
            no_chapters,
            chapters,
            max_upload_mb,
            no_archives,
            archive_html,
            json,
        } => commands::import(commands::ImportArgs {
            files,
            library,
            book,
            chapters: if no_chapters {
                Some(false)
            } else if chapters {
                Some(true)
            } else {
                None
            },
            max_upload_mb,
            no_archives,
            archive_html,
            json,
        }),

        Commands::Plan {
            archive,
            no_chapters,
            archive_html,
            json,
        } => commands::plan(&archive, !no_chapters, archive_html, json),

        Commands::Show { library, json } => commands::show(&library, json),

        Commands::Sanitize { files, jobs } => commands::sanitize(&files, jobs),
    }
}
