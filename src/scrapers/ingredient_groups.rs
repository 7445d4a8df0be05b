use log::debug;
use scraper::Html;

use super::{element_text, selector};
use crate::error::RecipeError;
use crate::model::IngredientGroup;

/// Read ingredient groups from WordPress Recipe Maker markup
///
/// JSON-LD flattens ingredients into one list, so the group headings only
/// survive in the card HTML. Returns an empty list when the page has none.
pub(super) fn wprm_groups(document: &Html) -> Result<Vec<IngredientGroup>, RecipeError> {
    let group_selector = selector(".wprm-recipe-ingredient-group")?;
    let name_selector = selector(".wprm-recipe-group-name")?;
    let item_selector = selector(".wprm-recipe-ingredient")?;

    let groups: Vec<IngredientGroup> = document
        .select(&group_selector)
        .map(|group| {
            let name = group
                .select(&name_selector)
                .next()
                .map(|el| element_text(&el))
                .filter(|name| !name.is_empty());
            let items = group
                .select(&item_selector)
                .map(|el| element_text(&el))
                .filter(|item| !item.is_empty())
                .collect();
            IngredientGroup::new(name, items)
        })
        .filter(|group| !group.items.is_empty())
        .collect();

    debug!("Found {} WPRM ingredient groups", groups.len());
    Ok(groups)
}
