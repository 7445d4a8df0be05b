pub mod batch;
pub mod catalog;
pub mod collector;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod scrapers;
pub mod store;

use std::path::PathBuf;

pub use crate::config::{SaveTarget, Settings};
pub use crate::error::{FieldError, RecipeError};
pub use crate::model::{Field, IngredientGroup, RecipeRecord};
pub use crate::pipeline::Pipeline;
pub use crate::scrapers::{RecipeScraper, RecipeSource, WebSource};
pub use crate::store::DocumentStore;

/// Build the web-backed pipeline that saves into the configured save directory
pub fn pipeline(settings: &Settings) -> Result<Pipeline, RecipeError> {
    let source = WebSource::new(settings)?;
    let store = DocumentStore::new(settings.save_dir()?);
    Ok(Pipeline::new(Box::new(source), store))
}

/// Fetch `url` and return the rendered document
pub fn view_recipe(url: &str, settings: &Settings) -> Result<String, RecipeError> {
    let source = WebSource::new(settings)?;
    // view never writes, so the store directory is irrelevant here
    Pipeline::new(Box::new(source), DocumentStore::new(&settings.output_dir)).view(url)
}

/// Fetch `url` and save the rendered document, returning its path
pub fn save_recipe(url: &str, settings: &Settings) -> Result<PathBuf, RecipeError> {
    pipeline(settings)?.save(url)
}
