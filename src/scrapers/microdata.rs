use log::debug;
use scraper::{ElementRef, Html};
use std::collections::{BTreeMap, HashMap};

use super::json_ld::{
    canonical_link, clean_diet_value, duration_minutes, normalize_yields, prep_plus_cook,
};
use super::{element_text, host_of, selector, FieldResult, RecipeScraper};
use crate::error::{FieldError, RecipeError};

/// Scraper over `itemscope itemtype="schema.org/Recipe"` markup
///
/// Values are read eagerly, since element references cannot outlive the
/// parsed document.
pub struct MicrodataScraper {
    url: String,
    props: HashMap<String, Vec<String>>,
    instructions: Vec<String>,
    nutrients: BTreeMap<String, String>,
    canonical: Option<String>,
}

impl MicrodataScraper {
    pub fn from_document(document: &Html, url: &str) -> Result<Option<Self>, RecipeError> {
        let Some(container) = find_recipe_container(document)? else {
            debug!("MicrodataScraper: No Recipe container found");
            return Ok(None);
        };

        let itemprop = selector("[itemprop]")?;
        let list_item = selector("li")?;
        let mut props: HashMap<String, Vec<String>> = HashMap::new();
        let mut instructions = Vec::new();
        let mut nutrients = BTreeMap::new();

        for element in container.select(&itemprop) {
            let Some(name) = element.value().attr("itemprop") else {
                continue;
            };
            let Some(scope) = nearest_scope(&element) else {
                continue;
            };

            if scope.id() == container.id() {
                if name == "recipeInstructions" {
                    let steps: Vec<String> = element
                        .select(&list_item)
                        .map(|li| element_text(&li))
                        .filter(|step| !step.is_empty())
                        .collect();
                    if steps.is_empty() {
                        instructions.push(prop_value(&element));
                    } else {
                        instructions.extend(steps);
                    }
                } else {
                    props
                        .entry(name.to_string())
                        .or_default()
                        .push(prop_value(&element));
                }
            } else if scope.value().attr("itemprop") == Some("nutrition") {
                let value = prop_value(&element);
                if !value.is_empty() {
                    nutrients.insert(name.to_string(), value);
                }
            }
        }

        instructions.retain(|step| !step.is_empty());
        for values in props.values_mut() {
            values.retain(|value| !value.is_empty());
        }

        Ok(Some(Self {
            url: url.to_string(),
            props,
            instructions,
            nutrients,
            canonical: canonical_link(document, url)?,
        }))
    }

    fn first(&self, prop: &str) -> FieldResult<String> {
        self.props
            .get(prop)
            .and_then(|values| values.first())
            .cloned()
            .ok_or(FieldError::Missing)
    }

    fn all(&self, prop: &str) -> FieldResult<Vec<String>> {
        match self.props.get(prop) {
            Some(values) if !values.is_empty() => Ok(values.clone()),
            _ => Err(FieldError::Missing),
        }
    }
}

impl RecipeScraper for MicrodataScraper {
    fn title(&self) -> FieldResult<String> {
        self.first("name")
    }

    fn yields(&self) -> FieldResult<String> {
        normalize_yields(&self.first("recipeYield")?).ok_or(FieldError::Missing)
    }

    fn total_time(&self) -> FieldResult<String> {
        match self.first("totalTime") {
            Ok(total) => Ok(duration_minutes(&total)
                .map(|minutes| minutes.to_string())
                .unwrap_or(total)),
            Err(_) => {
                let prep = self.first("prepTime").ok().and_then(|t| duration_minutes(&t));
                let cook = self.first("cookTime").ok().and_then(|t| duration_minutes(&t));
                prep_plus_cook(prep, cook)
            }
        }
    }

    fn ingredients(&self) -> FieldResult<Vec<String>> {
        // "ingredients" is the older data-vocabulary name
        self.all("recipeIngredient").or_else(|_| self.all("ingredients"))
    }

    fn instructions(&self) -> FieldResult<Vec<String>> {
        if self.instructions.is_empty() {
            Err(FieldError::Missing)
        } else {
            Ok(self.instructions.clone())
        }
    }

    fn equipment(&self) -> FieldResult<Vec<String>> {
        self.all("tool")
    }

    fn keywords(&self) -> FieldResult<Vec<String>> {
        let keywords: Vec<String> = self
            .all("keywords")?
            .iter()
            .flat_map(|value| value.split(','))
            .map(|keyword| keyword.trim().to_string())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        if keywords.is_empty() {
            Err(FieldError::Missing)
        } else {
            Ok(keywords)
        }
    }

    fn nutrients(&self) -> FieldResult<BTreeMap<String, String>> {
        if self.nutrients.is_empty() {
            Err(FieldError::Missing)
        } else {
            Ok(self.nutrients.clone())
        }
    }

    fn host(&self) -> FieldResult<String> {
        host_of(&self.url)
    }

    fn cooking_method(&self) -> FieldResult<String> {
        Ok(self.all("cookingMethod")?.join(", "))
    }

    fn dietary_restrictions(&self) -> FieldResult<String> {
        Ok(self
            .all("suitableForDiet")?
            .iter()
            .map(|diet| clean_diet_value(diet))
            .collect::<Vec<_>>()
            .join(", "))
    }

    fn canonical_url(&self) -> FieldResult<String> {
        self.canonical
            .clone()
            .or_else(|| self.first("url").ok())
            .ok_or(FieldError::Missing)
    }
}

fn find_recipe_container(document: &Html) -> Result<Option<ElementRef<'_>>, RecipeError> {
    let scoped = selector("[itemscope]")?;
    Ok(document.select(&scoped).find(|element| {
        element.value().attr("itemtype").is_some_and(|itemtype| {
            itemtype.contains("schema.org/Recipe") || itemtype.contains("data-vocabulary.org/Recipe")
        })
    }))
}

/// The closest ancestor carrying `itemscope`, which owns this property
fn nearest_scope<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().attr("itemscope").is_some())
}

/// Machine-readable attributes win over display text
fn prop_value(element: &ElementRef) -> String {
    let value = element.value();
    ["content", "datetime", "src"]
        .iter()
        .find_map(|attr| value.attr(attr))
        .map(|attr| attr.trim().to_string())
        .unwrap_or_else(|| element_text(element))
}
