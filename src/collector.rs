//! Best-effort field collection.
//!
//! The title is load-bearing and collected first: without it there is no
//! heading and no filename, so its failure aborts the invocation. Every other
//! field is read independently and a failure only drops that field.

use log::{info, warn};

use crate::error::{FieldError, RecipeError};
use crate::model::{Field, FieldNote, FieldStatus, FieldValue, RecipeRecord};
use crate::scrapers::{FieldResult, RecipeScraper};
use crate::store;

/// Call the accessor backing `field`
fn read(scraper: &dyn RecipeScraper, field: Field) -> FieldResult<FieldValue> {
    Ok(match field {
        Field::Title => FieldValue::Text(scraper.title()?),
        Field::Yields => FieldValue::Text(scraper.yields()?),
        Field::TotalTime => FieldValue::Text(scraper.total_time()?),
        Field::Ingredients => FieldValue::List(scraper.ingredients()?),
        Field::IngredientGroups => FieldValue::Groups(scraper.ingredient_groups()?),
        Field::Instructions => FieldValue::List(scraper.instructions()?),
        Field::Equipment => FieldValue::List(scraper.equipment()?),
        Field::Keywords => FieldValue::List(scraper.keywords()?),
        Field::Nutrients => FieldValue::Map(scraper.nutrients()?),
        Field::Host => FieldValue::Text(scraper.host()?),
        Field::CookingMethod => FieldValue::Text(scraper.cooking_method()?),
        Field::DietaryRestrictions => FieldValue::Text(scraper.dietary_restrictions()?),
        Field::CanonicalUrl => FieldValue::Text(scraper.canonical_url()?),
    })
}

/// Turn a field error into a note, logging it at the level its kind deserves
fn note(field: Field, err: FieldError) -> FieldNote {
    let status = if err.is_absent() {
        FieldStatus::Absent
    } else {
        FieldStatus::Failed(err.to_string())
    };
    let note = FieldNote { field, status };

    match note.status {
        FieldStatus::Absent => info!("    {}", note),
        FieldStatus::Failed(_) => warn!("    {}", note),
    }
    note
}

/// Build a best-effort record from `scraper`
///
/// Fails only when the title cannot be read or is blank.
pub fn collect(scraper: &dyn RecipeScraper, source_url: &str) -> Result<RecipeRecord, RecipeError> {
    let title = scraper
        .title()
        .map_err(|e| RecipeError::ScrapeFailed(format!("could not read title: {e}")))?;
    // The heading and the catalog both read a single line
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        return Err(RecipeError::ScrapeFailed("recipe title is empty".to_string()));
    }
    if store::file_name(&title).is_empty() {
        return Err(RecipeError::ScrapeFailed(format!(
            "recipe title {title:?} gives no file name"
        )));
    }

    let mut record = RecipeRecord::new(title, source_url);

    for field in Field::OPTIONAL {
        let outcome = read(scraper, field).and_then(|value| {
            if record.apply(field, value) {
                Ok(())
            } else {
                Err(FieldError::Other(format!("unexpected value shape for {field}")))
            }
        });

        if let Err(err) = outcome {
            let note = note(field, err);
            record.notes.push(note);
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IngredientGroup;
    use std::collections::BTreeMap;

    /// Every accessor succeeds unless listed in `broken`
    struct FakeScraper {
        broken: Vec<Field>,
    }

    impl FakeScraper {
        fn check(&self, field: Field) -> FieldResult<()> {
            if self.broken.contains(&field) {
                Err(FieldError::Schema(format!("bad {field} markup")))
            } else {
                Ok(())
            }
        }
    }

    impl RecipeScraper for FakeScraper {
        fn title(&self) -> FieldResult<String> {
            self.check(Field::Title)?;
            Ok("  Lemon Tart ".to_string())
        }

        fn yields(&self) -> FieldResult<String> {
            self.check(Field::Yields)?;
            Ok("8 servings".to_string())
        }

        fn total_time(&self) -> FieldResult<String> {
            self.check(Field::TotalTime)?;
            Ok("75".to_string())
        }

        fn ingredients(&self) -> FieldResult<Vec<String>> {
            self.check(Field::Ingredients)?;
            Ok(vec!["lemons".to_string(), "butter".to_string()])
        }

        fn ingredient_groups(&self) -> FieldResult<Vec<IngredientGroup>> {
            self.check(Field::IngredientGroups)?;
            Ok(vec![IngredientGroup::new(
                None,
                vec!["lemons".to_string(), "butter".to_string()],
            )])
        }

        fn instructions(&self) -> FieldResult<Vec<String>> {
            self.check(Field::Instructions)?;
            Ok(vec!["Zest".to_string(), "Bake".to_string()])
        }

        fn equipment(&self) -> FieldResult<Vec<String>> {
            self.check(Field::Equipment)?;
            Ok(vec!["tart tin".to_string()])
        }

        fn keywords(&self) -> FieldResult<Vec<String>> {
            self.check(Field::Keywords)?;
            Ok(vec!["dessert".to_string()])
        }

        fn nutrients(&self) -> FieldResult<BTreeMap<String, String>> {
            self.check(Field::Nutrients)?;
            Ok(BTreeMap::from([(
                "calories".to_string(),
                "310 kcal".to_string(),
            )]))
        }

        fn host(&self) -> FieldResult<String> {
            self.check(Field::Host)?;
            Ok("example.com".to_string())
        }

        fn cooking_method(&self) -> FieldResult<String> {
            self.check(Field::CookingMethod)?;
            Ok("Baking".to_string())
        }

        // dietary_restrictions and canonical_url keep the NotSupported default
    }

    #[test]
    fn test_all_fields_collected() {
        let scraper = FakeScraper { broken: vec![] };
        let record = collect(&scraper, "https://example.com/tart").unwrap();

        assert_eq!(record.title, "Lemon Tart");
        assert_eq!(record.source_url, "https://example.com/tart");
        assert_eq!(record.yields.as_deref(), Some("8 servings"));
        assert_eq!(record.total_time.as_deref(), Some("75"));
        assert_eq!(record.instructions, vec!["Zest", "Bake"]);
        assert_eq!(record.equipment, vec!["tart tin"]);
        assert_eq!(record.nutrients["calories"], "310 kcal");
        assert_eq!(record.cooking_method.as_deref(), Some("Baking"));

        assert_eq!(record.notes.len(), 2);
        assert_eq!(
            record.status_of(Field::DietaryRestrictions),
            Some(&FieldStatus::Absent)
        );
        assert_eq!(
            record.status_of(Field::CanonicalUrl),
            Some(&FieldStatus::Absent)
        );
    }

    #[test]
    fn test_nutrients_failure_is_isolated() {
        let scraper = FakeScraper {
            broken: vec![Field::Nutrients],
        };
        let record = collect(&scraper, "https://example.com/tart").unwrap();

        assert!(record.nutrients.is_empty());
        assert_eq!(record.yields.as_deref(), Some("8 servings"));
        assert_eq!(record.ingredients, vec!["lemons", "butter"]);
        assert_eq!(record.instructions, vec!["Zest", "Bake"]);
        assert_eq!(record.keywords, vec!["dessert"]);
        assert_eq!(record.host.as_deref(), Some("example.com"));

        let failed: Vec<&FieldNote> = record
            .notes
            .iter()
            .filter(|note| matches!(note.status, FieldStatus::Failed(_)))
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].field, Field::Nutrients);
        assert!(failed[0].to_string().contains("nutrients"));
        assert!(failed[0].to_string().contains("bad nutrients markup"));
    }

    #[test]
    fn test_many_failures_do_not_stop_collection() {
        let scraper = FakeScraper {
            broken: vec![Field::Yields, Field::Ingredients, Field::Host],
        };
        let record = collect(&scraper, "https://example.com/tart").unwrap();

        assert!(record.yields.is_none());
        assert!(record.ingredients.is_empty());
        assert!(record.host.is_none());
        assert_eq!(record.total_time.as_deref(), Some("75"));
        assert_eq!(record.cooking_method.as_deref(), Some("Baking"));
    }

    struct Titled(&'static str);

    impl RecipeScraper for Titled {
        fn title(&self) -> FieldResult<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_title_is_kept_on_one_line() {
        let record = collect(&Titled("Lemon\n  Tart\r\n"), "https://example.com/tart").unwrap();
        assert_eq!(record.title, "Lemon Tart");
    }

    #[test]
    fn test_title_without_file_name_aborts() {
        for title in ["///", " \\ / ", "\n\t"] {
            let result = collect(&Titled(title), "https://example.com/tart");
            assert!(
                matches!(result, Err(RecipeError::ScrapeFailed(_))),
                "title {title:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_title_failure_aborts() {
        let scraper = FakeScraper {
            broken: vec![Field::Title],
        };
        let result = collect(&scraper, "https://example.com/tart");
        assert!(matches!(result, Err(RecipeError::ScrapeFailed(_))));
    }
}
