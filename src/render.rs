use log::debug;
use std::fmt::Write;

use crate::error::RecipeError;
use crate::model::{FieldStatus, RecipeRecord};

const DIVIDER: &str = "---";

/// Render a record as a markdown document
///
/// The first line is always `# <title>`; the catalog reads titles from it.
/// Missing optional fields are left out. Fails only without a title.
pub fn render(record: &RecipeRecord) -> Result<String, RecipeError> {
    let title = record.title.trim();
    if title.is_empty() {
        return Err(RecipeError::TitleRequired);
    }

    for note in &record.notes {
        match &note.status {
            FieldStatus::Absent => debug!("Omitting {}: absent", note.field),
            FieldStatus::Failed(reason) => debug!("Omitting {}: failed ({})", note.field, reason),
        }
    }

    let mut doc = String::new();
    write_document(&mut doc, title, record)?;
    Ok(doc)
}

fn write_document(doc: &mut String, title: &str, record: &RecipeRecord) -> std::fmt::Result {
    writeln!(doc, "# {title}")?;
    writeln!(doc)?;

    if let Some(yields) = &record.yields {
        writeln!(doc, "**Serves:** {yields}")?;
    }
    if let Some(total_time) = &record.total_time {
        writeln!(doc, "**Total Time:** {}", with_minutes(total_time))?;
    }
    if !record.source_url.is_empty() {
        writeln!(doc, "**Source:** {}", record.source_url)?;
    }

    writeln!(doc)?;
    writeln!(doc, "{DIVIDER}")?;
    writeln!(doc)?;

    line(doc, "Host", record.host.as_deref())?;
    line(doc, "Total Time", record.total_time.as_deref().map(with_minutes).as_deref())?;
    line(doc, "Yields", record.yields.as_deref())?;
    if !record.nutrients.is_empty() {
        writeln!(doc, "**Nutrients:**")?;
        for (name, value) in &record.nutrients {
            writeln!(doc, "  - **{name}**: {value}")?;
        }
    }
    line(doc, "Canonical URL", record.canonical_url.as_deref())?;
    list_line(doc, "Equipment", &record.equipment)?;
    line(doc, "Cooking Method", record.cooking_method.as_deref())?;
    list_line(doc, "Keywords", &record.keywords)?;
    line(doc, "Dietary Restrictions", record.dietary_restrictions.as_deref())?;

    writeln!(doc)?;
    writeln!(doc, "{DIVIDER}")?;

    let groups = record.groups();
    if !groups.is_empty() {
        writeln!(doc)?;
        writeln!(doc, "## Ingredients")?;
        let show_headings = groups.len() > 1;
        for group in &groups {
            writeln!(doc)?;
            if show_headings {
                writeln!(doc, "### {}", group.name.as_deref().unwrap_or("Other"))?;
                writeln!(doc)?;
            }
            for item in &group.items {
                writeln!(doc, "- {item}")?;
            }
        }
    }

    if !record.instructions.is_empty() {
        writeln!(doc)?;
        writeln!(doc, "## Instructions")?;
        writeln!(doc)?;
        for (index, step) in record.instructions.iter().enumerate() {
            writeln!(doc, "{}. {}", index + 1, step)?;
        }
    }

    Ok(())
}

fn line(doc: &mut String, label: &str, value: Option<&str>) -> std::fmt::Result {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => writeln!(doc, "**{label}:** {value}"),
        _ => Ok(()),
    }
}

fn list_line(doc: &mut String, label: &str, values: &[String]) -> std::fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    writeln!(doc, "**{label}:** {}", values.join(", "))
}

/// Bare minute counts get a unit; free text is left alone
fn with_minutes(total_time: &str) -> String {
    if total_time.trim().parse::<u32>().is_ok() {
        format!("{} mins", total_time.trim())
    } else {
        total_time.to_string()
    }
}
