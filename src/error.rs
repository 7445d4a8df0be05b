use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a single recipe invocation (or a whole command)
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Failed to fetch the recipe page
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The page was fetched but holds no recipe we can read
    #[error("No recipe found on this webpage")]
    NoRecipeFound,

    /// The scraper could not produce a title, so nothing can be rendered or saved
    #[error("Scrape failed: {0}")]
    ScrapeFailed(String),

    /// Rendering was asked for a record without a title
    #[error("A recipe title is required to render a document")]
    TitleRequired,

    /// The document text could not be formatted
    #[error("Failed to render document: {0}")]
    Render(#[from] std::fmt::Error),

    /// Filesystem failure, tagged with the path involved
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A required setting is unset or empty
    #[error("Configuration missing: please set `{0}` in config.toml, then try again")]
    ConfigMissing(&'static str),

    /// A catalog selection does not name an entry
    #[error("No saved recipe numbered {0}")]
    NoSuchEntry(usize),

    /// The recipe URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl RecipeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RecipeError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a single field could not be read from a page
///
/// `NotSupported` and `Missing` mean the field is simply absent. `Schema` and
/// `Other` mean an extraction attempt was made and failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("field not supported by this scraper")]
    NotSupported,

    #[error("field not present on this page")]
    Missing,

    #[error("malformed structured data: {0}")]
    Schema(String),

    #[error("{0}")]
    Other(String),
}

impl FieldError {
    /// True when the field is absent rather than broken
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldError::NotSupported | FieldError::Missing)
    }
}

impl From<serde_json::Error> for FieldError {
    fn from(err: serde_json::Error) -> Self {
        FieldError::Schema(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_vs_failed() {
        assert!(FieldError::NotSupported.is_absent());
        assert!(FieldError::Missing.is_absent());
        assert!(!FieldError::Schema("bad".into()).is_absent());
        assert!(!FieldError::Other("boom".into()).is_absent());
    }

    #[test]
    fn test_format_failure_is_a_render_error() {
        let err = RecipeError::from(std::fmt::Error);
        assert!(matches!(err, RecipeError::Render(_)));
        assert!(err.to_string().starts_with("Failed to render document"));
    }

    #[test]
    fn test_config_missing_message_names_key() {
        let err = RecipeError::ConfigMissing("directory");
        assert!(err.to_string().contains("`directory`"));
    }
}
