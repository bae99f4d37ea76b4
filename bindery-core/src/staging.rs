//! Scoped on-disk staging of uploads

use crate::error::ImportError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Where uploads are written before processing
#[derive(Debug, Clone, Default)]
pub struct StagingArea {
    root: Option<PathBuf>,
}

/// An upload written to a private temporary directory.
///
/// The directory and everything in it are removed when this is dropped.
#[derive(Debug)]
pub struct StagedFile {
    dir: TempDir,
    path: PathBuf,
}

impl StagingArea {
    /// Stage under `root`, or the system temp dir when None
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Write `bytes` to a fresh scratch directory
    pub fn stage(&self, bytes: &[u8], extension: &str) -> Result<StagedFile, ImportError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("bindery-import-");

        let dir = match &self.root {
            Some(root) => {
                fs::create_dir_all(root).map_err(|e| storage_error("create staging root", e))?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| storage_error("create staging directory", e))?;

        let file_name = if extension.is_empty() {
            "upload".to_string()
        } else {
            format!("upload.{}", extension)
        };
        let path = dir.path().join(file_name);

        fs::write(&path, bytes).map_err(|e| storage_error("write staged upload", e))?;
        if !path.is_file() {
            return Err(ImportError::Storage(format!(
                "staged upload missing at {}",
                path.display()
            )));
        }

        debug!(path = %path.display(), bytes = bytes.len(), "Staged upload");
        Ok(StagedFile { dir, path })
    }
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the staged file
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Read the staged content back
    pub fn read(&self) -> Result<Vec<u8>, ImportError> {
        fs::read(&self.path).map_err(|e| storage_error("read staged upload", e))
    }

    /// Remove the staging directory now, reporting any failure
    pub fn close(self) -> Result<(), ImportError> {
        self.dir
            .close()
            .map_err(|e| storage_error("remove staging directory", e))
    }
}

fn storage_error(action: &str, err: std::io::Error) -> ImportError {
    ImportError::Storage(format!("Failed to {}: {}", action, err))
}
