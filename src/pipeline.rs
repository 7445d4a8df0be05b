use log::info;
use std::path::PathBuf;

use crate::collector;
use crate::error::RecipeError;
use crate::model::RecipeRecord;
use crate::render;
use crate::scrapers::RecipeSource;
use crate::store::DocumentStore;

/// The single-recipe flow: scrape, collect, render, and optionally store
pub struct Pipeline {
    source: Box<dyn RecipeSource>,
    store: DocumentStore,
}

impl Pipeline {
    pub fn new(source: Box<dyn RecipeSource>, store: DocumentStore) -> Self {
        Self { source, store }
    }

    /// Scrape `url` into a best-effort record
    pub fn record(&self, url: &str) -> Result<RecipeRecord, RecipeError> {
        info!("Beginning recipe at url: {}", url);
        let scraper = self.source.scrape(url)?;
        collector::collect(scraper.as_ref(), url)
    }

    /// Render the recipe at `url` without touching the filesystem
    pub fn view(&self, url: &str) -> Result<String, RecipeError> {
        render::render(&self.record(url)?)
    }

    /// Render the recipe at `url` and write it to the store
    pub fn save(&self, url: &str) -> Result<PathBuf, RecipeError> {
        let record = self.record(url)?;
        // Render fully before the file is created
        let document = render::render(&record)?;
        self.store.save(&record.title, &document)
    }
}
