use log::debug;
use scraper::{Html, Selector};
use std::collections::BTreeMap;

use crate::config::Settings;
use crate::error::{FieldError, RecipeError};
use crate::model::IngredientGroup;

mod fetcher;
mod ingredient_groups;
mod json_ld;
mod microdata;

pub use fetcher::RequestFetcher;
pub use json_ld::SchemaOrgScraper;
pub use microdata::MicrodataScraper;

pub type FieldResult<T> = Result<T, FieldError>;

/// Per-field access to a scraped recipe page
///
/// Every accessor may fail on its own. Accessors a scraper has no source
/// for answer `FieldError::NotSupported`.
pub trait RecipeScraper {
    fn title(&self) -> FieldResult<String>;

    fn yields(&self) -> FieldResult<String> {
        Err(FieldError::NotSupported)
    }

    /// Total time in minutes, or the page's free text if it is not a duration
    fn total_time(&self) -> FieldResult<String> {
        Err(FieldError::NotSupported)
    }

    fn ingredients(&self) -> FieldResult<Vec<String>> {
        Err(FieldError::NotSupported)
    }

    fn ingredient_groups(&self) -> FieldResult<Vec<IngredientGroup>> {
        Err(FieldError::NotSupported)
    }

    fn instructions(&self) -> FieldResult<Vec<String>> {
        Err(FieldError::NotSupported)
    }

    fn equipment(&self) -> FieldResult<Vec<String>> {
        Err(FieldError::NotSupported)
    }

    fn keywords(&self) -> FieldResult<Vec<String>> {
        Err(FieldError::NotSupported)
    }

    fn nutrients(&self) -> FieldResult<BTreeMap<String, String>> {
        Err(FieldError::NotSupported)
    }

    fn host(&self) -> FieldResult<String> {
        Err(FieldError::NotSupported)
    }

    fn cooking_method(&self) -> FieldResult<String> {
        Err(FieldError::NotSupported)
    }

    fn dietary_restrictions(&self) -> FieldResult<String> {
        Err(FieldError::NotSupported)
    }

    fn canonical_url(&self) -> FieldResult<String> {
        Err(FieldError::NotSupported)
    }
}

/// Turns a URL into a scraper, or fails for the whole page
pub trait RecipeSource {
    fn scrape(&self, url: &str) -> Result<Box<dyn RecipeScraper>, RecipeError>;
}

/// Fetches pages over HTTP and parses them with the schema.org scrapers
pub struct WebSource {
    fetcher: RequestFetcher,
    wild_mode: bool,
}

impl WebSource {
    pub fn new(settings: &Settings) -> Result<Self, RecipeError> {
        Ok(Self {
            fetcher: RequestFetcher::new(Some(settings.timeout()))?,
            wild_mode: settings.wild_mode,
        })
    }
}

impl RecipeSource for WebSource {
    fn scrape(&self, url: &str) -> Result<Box<dyn RecipeScraper>, RecipeError> {
        let html = self.fetcher.fetch(url)?;
        scrape_html(&html, url, self.wild_mode)
    }
}

/// Parse an already fetched page
///
/// JSON-LD is tried first. With `wild_mode` on, pages without a JSON-LD
/// recipe fall back to schema.org microdata.
pub fn scrape_html(
    html: &str,
    url: &str,
    wild_mode: bool,
) -> Result<Box<dyn RecipeScraper>, RecipeError> {
    let document = Html::parse_document(html);

    if let Some(scraper) = SchemaOrgScraper::from_document(&document, url)? {
        debug!("Using JSON-LD scraper for {}", url);
        return Ok(Box::new(scraper));
    }

    if wild_mode {
        if let Some(scraper) = MicrodataScraper::from_document(&document, url)? {
            debug!("Using microdata scraper for {}", url);
            return Ok(Box::new(scraper));
        }
    }

    Err(RecipeError::NoRecipeFound)
}

fn selector(css: &str) -> Result<Selector, RecipeError> {
    Selector::parse(css)
        .map_err(|e| RecipeError::ScrapeFailed(format!("invalid selector `{css}`: {e}")))
}

/// Host part of a page URL, without a leading `www.`
fn host_of(url: &str) -> FieldResult<String> {
    let parsed = url::Url::parse(url).map_err(|e| FieldError::Other(e.to_string()))?;
    let host = parsed.host_str().ok_or(FieldError::Missing)?;
    Ok(host.trim_start_matches("www.").to_string())
}

/// Whitespace-normalised text content of an element
fn element_text(element: &scraper::ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
