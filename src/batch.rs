use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RecipeError;
use crate::pipeline::Pipeline;

/// One line of a batch that could not be saved
#[derive(Debug)]
pub struct BatchFailure {
    /// 1-based line number in the URL list
    pub line: usize,
    pub url: String,
    pub error: RecipeError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub saved: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

/// The URLs to process: trimmed, skipping blank lines and `#` comments
pub fn urls(list: &str) -> impl Iterator<Item = (usize, &str)> {
    list.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Save every recipe listed in `path`, one at a time
///
/// A failing line is logged and recorded, and the batch moves on. Only an
/// unreadable list file is an error.
pub fn run(pipeline: &Pipeline, path: &Path) -> Result<BatchReport, RecipeError> {
    let list = fs::read_to_string(path).map_err(|e| RecipeError::io(path, e))?;
    let mut report = BatchReport::default();

    for (line, url) in urls(&list) {
        match pipeline.save(url) {
            Ok(saved) => report.saved.push(saved),
            Err(e) => {
                error!("    Could not save recipe on line {} ({}): {}", line, url, e);
                report.failed.push(BatchFailure {
                    line,
                    url: url.to_string(),
                    error: e,
                });
            }
        }
    }

    info!(
        "Batch finished: {} saved, {} failed",
        report.saved.len(),
        report.failed.len()
    );
    Ok(report)
}
