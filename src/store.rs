use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RecipeError;

/// Extension of rendered recipe documents
pub const DOCUMENT_EXTENSION: &str = "md";

/// Derive a file stem from a recipe title
///
/// Lower-cases the title and collapses every whitespace run into a single
/// hyphen. Leading and trailing whitespace is dropped, and path separators are
/// treated like whitespace so a title can never point outside the store.
pub fn file_name(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '/' || c == '\\')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Writes rendered documents into one directory
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path the document for `title` is written to
    pub fn path_for(&self, title: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", file_name(title), DOCUMENT_EXTENSION))
    }

    /// Write `document` for `title`, replacing any previous file
    pub fn save(&self, title: &str, document: &str) -> Result<PathBuf, RecipeError> {
        self.ensure_dir()?;

        let path = self.path_for(title);
        fs::write(&path, document).map_err(|e| RecipeError::io(&path, e))?;
        info!("Saved recipe to {}", path.display());
        Ok(path)
    }

    fn ensure_dir(&self) -> Result<(), RecipeError> {
        if self.dir.is_dir() {
            return Ok(());
        }
        debug!("Creating output directory {}", self.dir.display());

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o777);
        }
        builder
            .create(&self.dir)
            .map_err(|e| RecipeError::io(&self.dir, e))
    }
}
