//! Browse previously saved recipe documents.
//!
//! Listing → awaiting selection → displaying (or quit). Invalid input loops
//! back to the prompt instead of recursing.

use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::RecipeError;
use crate::store::DOCUMENT_EXTENSION;

pub const QUIT_TOKEN: &str = "q";
const PROMPT: &str = "Enter a number to choose a recipe. Or, enter 'q' to quit.";

/// A saved document, as listed by the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub file_name: String,
    pub path: PathBuf,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Quit,
    /// 0-based index into the catalog
    Entry(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseOutcome {
    Displayed(PathBuf),
    Quit,
}

/// Parse one line of user input against a catalog of `len` entries
pub fn parse_selection(input: &str, len: usize) -> Option<Selection> {
    let input = input.trim();
    if input == QUIT_TOKEN {
        return Some(Selection::Quit);
    }
    match input.parse::<usize>() {
        Ok(ordinal) if (1..=len).contains(&ordinal) => Some(Selection::Entry(ordinal - 1)),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// List the documents in `dir`, sorted by file name
    pub fn open(dir: &Path) -> Result<Self, RecipeError> {
        let read_dir = fs::read_dir(dir).map_err(|e| RecipeError::io(dir, e))?;
        let mut entries = Vec::new();

        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| RecipeError::io(dir, e))?;
            let path = dir_entry.path();
            let is_document = path
                .extension()
                .is_some_and(|ext| ext == DOCUMENT_EXTENSION);
            if !is_document || !path.is_file() {
                continue;
            }

            let file_name = dir_entry.file_name().to_string_lossy().into_owned();
            let title = match read_title(&path) {
                Ok(title) => title,
                Err(e) => {
                    warn!("Skipping unreadable document: {}", e);
                    continue;
                }
            };
            entries.push(CatalogEntry {
                file_name,
                path,
                title,
            });
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!("Catalog at {} has {} entries", dir.display(), entries.len());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full text of the entry at a 0-based index
    pub fn read(&self, index: usize) -> Result<(&CatalogEntry, String), RecipeError> {
        let entry = self
            .entries
            .get(index)
            .ok_or(RecipeError::NoSuchEntry(index + 1))?;
        let text = fs::read_to_string(&entry.path).map_err(|e| RecipeError::io(&entry.path, e))?;
        Ok((entry, text))
    }
}

/// First line of a document with one leading `#` stripped
fn read_title(path: &Path) -> Result<String, RecipeError> {
    let file = File::open(path).map_err(|e| RecipeError::io(path, e))?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|e| RecipeError::io(path, e))?;

    let line = first_line.trim_end_matches(['\r', '\n']);
    Ok(line.strip_prefix('#').unwrap_or(line).trim().to_string())
}

/// Run one interactive browse session
///
/// End of input counts as quitting.
pub fn browse<R: BufRead, W: Write>(
    catalog: &Catalog,
    mut input: R,
    mut output: W,
) -> Result<BrowseOutcome, RecipeError> {
    let console = |e| RecipeError::io("<console>", e);

    if catalog.is_empty() {
        writeln!(output, "No saved recipes found.").map_err(console)?;
        return Ok(BrowseOutcome::Quit);
    }

    for (index, entry) in catalog.entries().iter().enumerate() {
        writeln!(output, "{} {}", index + 1, entry.title).map_err(console)?;
    }

    loop {
        writeln!(output, "{PROMPT}").map_err(console)?;
        output.flush().map_err(console)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(console)? == 0 {
            return Ok(BrowseOutcome::Quit);
        }

        match parse_selection(&line, catalog.entries().len()) {
            Some(Selection::Quit) => return Ok(BrowseOutcome::Quit),
            Some(Selection::Entry(index)) => match catalog.read(index) {
                Ok((entry, text)) => {
                    writeln!(output).map_err(console)?;
                    writeln!(output, "{text}").map_err(console)?;
                    return Ok(BrowseOutcome::Displayed(entry.path.clone()));
                }
                Err(e) => {
                    warn!("Could not open selection: {}", e);
                    writeln!(output, "\nCould not open that recipe. Try again.\n")
                        .map_err(console)?;
                }
            },
            None => {
                debug!("Rejected selection {:?}", line.trim());
                writeln!(output, "\nInput error. Try again.\n").map_err(console)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("b-soup.md"), "# Soup\n\nHot.\n").unwrap();
        fs::write(temp.path().join("a-bread.md"), "# Bread\n\nWarm.\n").unwrap();
        fs::write(temp.path().join("notes.txt"), "# Not a recipe\n").unwrap();
        fs::create_dir(temp.path().join("drafts.md")).unwrap();
        temp
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("q\n", 3), Some(Selection::Quit));
        assert_eq!(parse_selection(" 2 ", 3), Some(Selection::Entry(1)));
        assert_eq!(parse_selection("3", 3), Some(Selection::Entry(2)));
        assert_eq!(parse_selection("0", 3), None);
        assert_eq!(parse_selection("4", 3), None);
        assert_eq!(parse_selection("two", 3), None);
        assert_eq!(parse_selection("Q", 3), None);
        assert_eq!(parse_selection("", 3), None);
    }

    #[test]
    fn test_open_lists_documents_sorted() {
        let temp = library();
        let catalog = Catalog::open(temp.path()).unwrap();

        let names: Vec<&str> = catalog
            .entries()
            .iter()
            .map(|e| e.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["a-bread.md", "b-soup.md"]);
        assert_eq!(catalog.entries()[0].title, "Bread");
        assert_eq!(catalog.entries()[1].title, "Soup");
    }

    #[test]
    fn test_read_out_of_range() {
        let temp = library();
        let catalog = Catalog::open(temp.path()).unwrap();
        assert!(matches!(catalog.read(5), Err(RecipeError::NoSuchEntry(6))));
        let (entry, text) = catalog.read(0).unwrap();
        assert_eq!(entry.title, "Bread");
        assert!(text.contains("Warm."));
    }

    #[test]
    fn test_title_strips_single_marker() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("x.md");
        fs::write(&path, "## Sub heading\r\nbody").unwrap();
        assert_eq!(read_title(&path).unwrap(), "# Sub heading");
    }

    #[test]
    fn test_browse_reprompts_until_valid() {
        let temp = library();
        let catalog = Catalog::open(temp.path()).unwrap();
        let mut output = Vec::new();

        let outcome = browse(&catalog, "abc\n9\n2\n".as_bytes(), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_eq!(outcome, BrowseOutcome::Displayed(temp.path().join("b-soup.md")));
        assert_eq!(output.matches("Input error. Try again.").count(), 2);
        assert_eq!(output.matches(PROMPT).count(), 3);
        assert!(output.contains("1 Bread\n2 Soup\n"));
        assert!(output.contains("# Soup\n\nHot.\n"));
    }

    #[test]
    fn test_browse_reprompts_when_selection_vanished() {
        let temp = library();
        let catalog = Catalog::open(temp.path()).unwrap();
        fs::remove_file(temp.path().join("a-bread.md")).unwrap();
        let mut output = Vec::new();

        let outcome = browse(&catalog, "1\n2\n".as_bytes(), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_eq!(outcome, BrowseOutcome::Displayed(temp.path().join("b-soup.md")));
        assert!(output.contains("Could not open that recipe. Try again."));
        assert_eq!(output.matches(PROMPT).count(), 2);
    }

    #[test]
    fn test_browse_quit_and_eof() {
        let temp = library();
        let catalog = Catalog::open(temp.path()).unwrap();

        let outcome = browse(&catalog, "q\n".as_bytes(), Vec::new()).unwrap();
        assert_eq!(outcome, BrowseOutcome::Quit);

        let outcome = browse(&catalog, "7\n".as_bytes(), Vec::new()).unwrap();
        assert_eq!(outcome, BrowseOutcome::Quit);
    }

    #[test]
    fn test_browse_empty_catalog() {
        let temp = tempfile::tempdir().unwrap();
        let catalog = Catalog::open(temp.path()).unwrap();
        let mut output = Vec::new();

        let outcome = browse(&catalog, "1\n".as_bytes(), &mut output).unwrap();
        assert_eq!(outcome, BrowseOutcome::Quit);
        assert!(String::from_utf8(output).unwrap().contains("No saved recipes"));
    }
}
