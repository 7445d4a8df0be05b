use html_escape::decode_html_entities;
use log::debug;
use scraper::Html;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{element_text, host_of, ingredient_groups, selector, FieldResult, RecipeScraper};
use crate::error::{FieldError, RecipeError};
use crate::model::IngredientGroup;

/// Scraper over the schema.org `Recipe` node embedded as JSON-LD
pub struct SchemaOrgScraper {
    url: String,
    recipe: Value,
    canonical: Option<String>,
    groups: Vec<IngredientGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeYield {
    Number(serde_json::Number),
    String(String),
    Array(Vec<Value>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeIngredients {
    String(String),
    Strings(Vec<String>),
    Objects(Vec<IngredientObject>),
}

#[derive(Debug, Deserialize)]
struct IngredientObject {
    name: String,
    amount: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Keywords {
    String(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tool {
    Name(String),
    Object(ToolObject),
}

#[derive(Debug, Deserialize)]
struct ToolObject {
    name: Option<String>,
}

impl SchemaOrgScraper {
    /// Find the first JSON-LD block describing a recipe
    ///
    /// Returns `Ok(None)` when the page has no usable JSON-LD recipe.
    pub fn from_document(document: &Html, url: &str) -> Result<Option<Self>, RecipeError> {
        let scripts = selector("script[type='application/ld+json']")?;

        for (index, script) in document.select(&scripts).enumerate() {
            let raw_json = script.inner_html();
            let json_ld = match parse_json_ld(&raw_json) {
                Ok(json_ld) => json_ld,
                Err(e) => {
                    debug!("SchemaOrgScraper: Failed to parse JSON-LD {}: {}", index, e);
                    continue;
                }
            };

            if let Some(recipe) = find_recipe(&json_ld) {
                debug!("SchemaOrgScraper: Found recipe in JSON-LD {}", index);
                return Ok(Some(Self {
                    url: url.to_string(),
                    recipe: recipe.clone(),
                    canonical: canonical_link(document, url)?,
                    groups: ingredient_groups::wprm_groups(document)?,
                }));
            }
        }

        debug!("SchemaOrgScraper: No recipe found in any JSON-LD script");
        Ok(None)
    }

    /// Deserialize one property of the recipe node; missing and null are `Missing`
    fn property<T: DeserializeOwned>(&self, key: &str) -> FieldResult<T> {
        let value = self
            .recipe
            .get(key)
            .filter(|value| !value.is_null())
            .ok_or(FieldError::Missing)?;
        Ok(T::deserialize(value)?)
    }

    fn text_property(&self, key: &str) -> FieldResult<String> {
        let text = decode_html_symbols(&self.property::<String>(key)?);
        let text = text.trim();
        if text.is_empty() {
            Err(FieldError::Missing)
        } else {
            Ok(text.to_string())
        }
    }

    fn duration_property(&self, key: &str) -> FieldResult<Option<u32>> {
        match self.property::<String>(key) {
            Ok(duration) => Ok(duration_minutes(&duration)),
            Err(FieldError::Missing) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl RecipeScraper for SchemaOrgScraper {
    fn title(&self) -> FieldResult<String> {
        self.text_property("name")
    }

    fn yields(&self) -> FieldResult<String> {
        let raw = match self.property::<RecipeYield>("recipeYield")? {
            RecipeYield::Number(n) => n.to_string(),
            RecipeYield::String(s) => s,
            RecipeYield::Array(values) => {
                let texts: Vec<String> = values.iter().filter_map(value_text).collect();
                // Prefer the descriptive variant ("12 cookies") over a bare number
                texts
                    .iter()
                    .find(|s| s.contains(char::is_alphabetic))
                    .or_else(|| texts.first())
                    .cloned()
                    .ok_or(FieldError::Missing)?
            }
        };
        normalize_yields(&decode_html_symbols(&raw)).ok_or(FieldError::Missing)
    }

    fn total_time(&self) -> FieldResult<String> {
        match self.property::<String>("totalTime") {
            Ok(total) => Ok(duration_minutes(&total)
                .map(|minutes| minutes.to_string())
                .unwrap_or_else(|| decode_html_symbols(total.trim()))),
            Err(FieldError::Missing) => {
                let prep = self.duration_property("prepTime")?;
                let cook = self.duration_property("cookTime")?;
                prep_plus_cook(prep, cook)
            }
            Err(e) => Err(e),
        }
    }

    fn ingredients(&self) -> FieldResult<Vec<String>> {
        let ingredients: Vec<String> = match self.property::<RecipeIngredients>("recipeIngredient")? {
            RecipeIngredients::String(text) => text.lines().map(decode_html_symbols).collect(),
            RecipeIngredients::Strings(items) => {
                items.iter().map(|ing| decode_html_symbols(ing)).collect()
            }
            RecipeIngredients::Objects(items) => items
                .into_iter()
                .map(|ing| {
                    let amount = ing.amount.as_deref().unwrap_or("").trim();
                    let name = decode_html_symbols(&ing.name);
                    if amount.is_empty() {
                        name
                    } else {
                        format!("{amount} {name}")
                    }
                })
                .collect(),
        };

        Ok(ingredients
            .into_iter()
            .map(|ing| ing.trim().to_string())
            .filter(|ing| !ing.is_empty())
            .collect())
    }

    fn ingredient_groups(&self) -> FieldResult<Vec<IngredientGroup>> {
        if !self.groups.is_empty() {
            return Ok(self.groups.clone());
        }
        Ok(vec![IngredientGroup::new(None, self.ingredients()?)])
    }

    fn instructions(&self) -> FieldResult<Vec<String>> {
        let value = self.property::<Value>("recipeInstructions")?;
        if !matches!(value, Value::String(_) | Value::Array(_) | Value::Object(_)) {
            return Err(FieldError::Schema(format!(
                "recipeInstructions has unexpected type: {value}"
            )));
        }

        let mut steps = Vec::new();
        collect_steps(&value, &mut steps);
        Ok(steps)
    }

    fn equipment(&self) -> FieldResult<Vec<String>> {
        Ok(self
            .property::<OneOrMany<Tool>>("tool")?
            .into_vec()
            .into_iter()
            .filter_map(|tool| match tool {
                Tool::Name(name) => Some(name),
                Tool::Object(obj) => obj.name,
            })
            .map(|name| decode_html_symbols(name.trim()))
            .filter(|name| !name.is_empty())
            .collect())
    }

    fn keywords(&self) -> FieldResult<Vec<String>> {
        let raw = match self.property::<Keywords>("keywords")? {
            Keywords::String(s) => s.split(',').map(str::to_string).collect::<Vec<_>>(),
            Keywords::Multiple(v) => v,
        };

        let mut keywords: Vec<String> = Vec::new();
        for keyword in raw {
            let keyword = decode_html_symbols(keyword.trim());
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        Ok(keywords)
    }

    fn nutrients(&self) -> FieldResult<BTreeMap<String, String>> {
        let nutrition = self.property::<BTreeMap<String, Value>>("nutrition")?;
        Ok(nutrition
            .into_iter()
            .filter(|(key, _)| !key.starts_with('@'))
            .filter_map(|(key, value)| value_text(&value).map(|text| (key, text)))
            .filter(|(_, text)| !text.is_empty())
            .collect())
    }

    fn host(&self) -> FieldResult<String> {
        host_of(&self.url)
    }

    fn cooking_method(&self) -> FieldResult<String> {
        let methods = self.property::<OneOrMany<String>>("cookingMethod")?.into_vec();
        joined(methods.iter().map(|m| decode_html_symbols(m.trim())))
    }

    fn dietary_restrictions(&self) -> FieldResult<String> {
        let diets = self.property::<OneOrMany<String>>("suitableForDiet")?.into_vec();
        joined(diets.iter().map(|d| clean_diet_value(d)))
    }

    fn canonical_url(&self) -> FieldResult<String> {
        match &self.canonical {
            Some(canonical) => Ok(canonical.clone()),
            None => self.text_property("url"),
        }
    }
}

fn joined(values: impl Iterator<Item = String>) -> FieldResult<String> {
    let values: Vec<String> = values.filter(|v| !v.is_empty()).collect();
    if values.is_empty() {
        Err(FieldError::Missing)
    } else {
        Ok(values.join(", "))
    }
}

/// Parse a JSON-LD block, retrying once on a sanitized copy
fn parse_json_ld(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str::<Value>(raw.trim()).or_else(|_| serde_json::from_str(&sanitize_json(raw)))
}

/// Repair common breakage in hand-written JSON-LD: comment and CDATA
/// wrappers, and trailing commas before a closing bracket
fn sanitize_json(json_str: &str) -> String {
    let cleaned = json_str
        .trim()
        .replace("<!--", "")
        .replace("-->", "")
        .replace("<![CDATA[", "")
        .replace("]]>", "");

    let mut out = String::with_capacity(cleaned.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_comma = false;

    for c in cleaned.chars() {
        if in_string {
            out.push(c);
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            ',' => {
                if pending_comma {
                    continue;
                }
                pending_comma = true;
            }
            c if c.is_whitespace() => {}
            ']' | '}' => {
                pending_comma = false;
                out.push(c);
            }
            _ => {
                if pending_comma {
                    out.push(',');
                    pending_comma = false;
                }
                if c == '"' {
                    in_string = true;
                }
                out.push(c);
            }
        }
    }

    debug!("Sanitized JSON: {}", out);
    out
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| kind.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

fn find_recipe(json_ld: &Value) -> Option<&Value> {
    if let Some(items) = json_ld.as_array() {
        items
            .iter()
            .find(|item| is_recipe_type(item) || item.get("recipeInstructions").is_some())
    } else if is_recipe_type(json_ld) {
        Some(json_ld)
    } else if let Some(graph) = json_ld.get("@graph") {
        graph.as_array()?.iter().find(|item| is_recipe_type(item))
    } else {
        None
    }
}

pub(super) fn canonical_link(document: &Html, url: &str) -> Result<Option<String>, RecipeError> {
    let link = selector("link[rel='canonical']")?;
    let href = document
        .select(&link)
        .find_map(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty());

    Ok(href.map(|href| match url::Url::parse(url).and_then(|base| base.join(href)) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => href.to_string(),
    }))
}

/// Walk HowToStep / HowToSection / plain string instructions in order
fn collect_steps(value: &Value, steps: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            for line in text.lines() {
                let step = clean_step(line);
                if !step.is_empty() {
                    steps.push(step);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_steps(item, steps);
            }
        }
        Value::Object(map) => {
            if let Some(elements) = map.get("itemListElement") {
                collect_steps(elements, steps);
            } else if let Some(text) = ["text", "name", "description"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
            {
                let step = clean_step(text);
                if !step.is_empty() {
                    steps.push(step);
                }
            }
        }
        _ => {}
    }
}

/// Decode entities and drop any inline markup from a step
fn clean_step(text: &str) -> String {
    let decoded = decode_html_symbols(text);
    if decoded.contains('<') {
        let fragment = Html::parse_fragment(&decoded);
        element_text(&fragment.root_element())
    } else {
        decoded.trim().to_string()
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(decode_html_symbols(s.trim())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decode_html_symbols(text: &str) -> String {
    // for some reason need to decode twice to get the correct string
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

pub(super) fn clean_diet_value(diet: &str) -> String {
    diet.trim()
        .trim_start_matches("https://schema.org/")
        .trim_start_matches("http://schema.org/")
        .replace("Diet", "")
        .trim()
        .to_string()
}

/// A bare count becomes "N servings"; descriptive yields pass through
pub(super) fn normalize_yields(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u32>() {
        Ok(1) => Some("1 serving".to_string()),
        Ok(n) => Some(format!("{n} servings")),
        Err(_) => Some(raw.to_string()),
    }
}

/// Total time from separate prep and cook durations
pub(super) fn prep_plus_cook(prep: Option<u32>, cook: Option<u32>) -> FieldResult<String> {
    match (prep, cook) {
        (None, None) => Err(FieldError::Missing),
        (prep, cook) => prep
            .unwrap_or(0)
            .checked_add(cook.unwrap_or(0))
            .map(|minutes| minutes.to_string())
            .ok_or_else(|| FieldError::Schema("prepTime plus cookTime is out of range".to_string())),
    }
}

/// Convert an ISO 8601 duration to whole minutes
///
/// Handles days, decimal seconds (`PT5400.0S`) and minute ranges
/// (`PT15-20M`, which counts as the upper bound).
pub(super) fn duration_minutes(duration: &str) -> Option<u32> {
    let rest = duration.trim().strip_prefix('P')?;
    let mut minutes = 0.0_f64;
    let mut number = String::new();
    let mut matched = false;
    let mut in_time = false;

    for c in rest.chars() {
        match c {
            'T' => in_time = true,
            '0'..='9' | '.' | '-' => number.push(c),
            unit => {
                let upper = number.rsplit('-').next().unwrap_or_default();
                let value: f64 = upper.parse().ok()?;
                minutes += match (unit, in_time) {
                    ('D', false) => value * 24.0 * 60.0,
                    ('H', true) => value * 60.0,
                    ('M', true) => value,
                    ('S', true) => value / 60.0,
                    _ => return None,
                };
                number.clear();
                matched = true;
            }
        }
    }

    if matched && number.is_empty() {
        Some(minutes.round() as u32)
    } else {
        None
    }
}
