//! Error types for Bindery Core

use thiserror::Error;

/// Result type alias using ImportError
pub type Result<T> = std::result::Result<T, ImportError>;

/// Top-level error type for all import operations
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{0}")]
    Policy(#[from] PolicyViolation),

    #[error("{0}")]
    Archive(#[from] ArchiveError),

    #[error("{0}")]
    Content(#[from] ContentError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Staging failed: {0}")]
    Storage(String),

    #[error("Invalid target book: {0}")]
    InvalidRoot(String),
}

/// User-correctable violations of the import policy
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("ZIP imports are disabled by configuration ({name})")]
    ArchivesDisabled { name: String },

    #[error("Unsupported file type '{extension}' for {name}; only Markdown, HTML and ZIP files are supported")]
    UnsupportedType { name: String, extension: String },

    #[error("{name} exceeds the maximum upload size of {limit_mb} MB")]
    UploadTooLarge { name: String, limit_mb: u64 },

    #[error("ZIP contents exceed the maximum allowed size of {limit_bytes} bytes")]
    ArchiveTooLarge { limit_bytes: u64 },

    #[error("ZIP archive contains no importable files")]
    EmptyArchive,
}

/// Reasons an archive could not be opened or read
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Unable to open ZIP file: the archive is inconsistent ({0})")]
    Inconsistent(String),

    #[error("Unable to open ZIP file: invalid argument ({0})")]
    InvalidArgument(String),

    #[error("Unable to open ZIP file: memory limit reached")]
    MemoryLimit,

    #[error("Unable to open ZIP file: file not found")]
    NotFound,

    #[error("Unable to open ZIP file: not a ZIP archive")]
    NotAZip,

    #[error("Unable to open ZIP file: {0}")]
    Open(String),

    #[error("Unable to read ZIP file: {0}")]
    Read(String),

    #[error("Unable to read ZIP file: seek failed ({0})")]
    Seek(String),

    #[error("Unsupported ZIP archive: {0}")]
    Unsupported(String),
}

/// Faults while turning one file into page content
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Markdown rendering failed: {0}")]
    Render(String),
}

/// Errors reported by a content store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("Chapter not found: {0}")]
    ChapterNotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        use zip::result::ZipError;

        match err {
            ZipError::Io(io) => ArchiveError::from_io(io),
            ZipError::InvalidArchive(msg)
                if msg.contains("central directory end") || msg.contains("Invalid zip header") =>
            {
                ArchiveError::NotAZip
            }
            ZipError::InvalidArchive(msg) => ArchiveError::Inconsistent(msg.to_string()),
            ZipError::UnsupportedArchive(msg) => ArchiveError::Unsupported(msg.to_string()),
            ZipError::FileNotFound => ArchiveError::NotFound,
            #[allow(unreachable_patterns)]
            other => ArchiveError::Open(other.to_string()),
        }
    }
}

impl ArchiveError {
    /// Classify an IO failure raised while opening or walking an archive
    pub fn from_io(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => ArchiveError::NotFound,
            ErrorKind::OutOfMemory => ArchiveError::MemoryLimit,
            ErrorKind::InvalidInput => ArchiveError::Seek(err.to_string()),
            ErrorKind::PermissionDenied => ArchiveError::Open(err.to_string()),
            _ => ArchiveError::Read(err.to_string()),
        }
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::from_io(err)
    }
}
