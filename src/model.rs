use std::collections::BTreeMap;
use std::fmt;

/// The fields the collector asks a scraper for, in collection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Yields,
    TotalTime,
    Ingredients,
    IngredientGroups,
    Instructions,
    Equipment,
    Keywords,
    Nutrients,
    Host,
    CookingMethod,
    DietaryRestrictions,
    CanonicalUrl,
}

impl Field {
    /// Every field besides the title, which is collected first and separately
    pub const OPTIONAL: [Field; 12] = [
        Field::Yields,
        Field::TotalTime,
        Field::Ingredients,
        Field::IngredientGroups,
        Field::Instructions,
        Field::Equipment,
        Field::Keywords,
        Field::Nutrients,
        Field::Host,
        Field::CookingMethod,
        Field::DietaryRestrictions,
        Field::CanonicalUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Yields => "yields",
            Field::TotalTime => "total_time",
            Field::Ingredients => "ingredients",
            Field::IngredientGroups => "ingredient_groups",
            Field::Instructions => "instructions",
            Field::Equipment => "equipment",
            Field::Keywords => "keywords",
            Field::Nutrients => "nutrients",
            Field::Host => "host",
            Field::CookingMethod => "cooking_method",
            Field::DietaryRestrictions => "dietary_restrictions",
            Field::CanonicalUrl => "canonical_url",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run of ingredients under an optional heading ("For the sauce")
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientGroup {
    pub name: Option<String>,
    pub items: Vec<String>,
}

impl IngredientGroup {
    pub fn new(name: Option<String>, items: Vec<String>) -> Self {
        Self { name, items }
    }
}

/// A raw value returned by one scraper accessor
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Groups(Vec<IngredientGroup>),
    Map(BTreeMap<String, String>),
}

/// Why a field did not make it into the record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldStatus {
    /// The page or scraper has no such field
    Absent,
    /// An extraction attempt raised; the text is the underlying error
    Failed(String),
}

/// One collector diagnostic: a field that is not in the record, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNote {
    pub field: Field,
    pub status: FieldStatus,
}

impl fmt::Display for FieldNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            FieldStatus::Absent => write!(f, "No {} found", self.field),
            FieldStatus::Failed(reason) => write!(f, "Could not read {}: {}", self.field, reason),
        }
    }
}

/// Best-effort recipe: every field besides the title may be missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeRecord {
    pub title: String,
    pub source_url: String,
    pub yields: Option<String>,
    pub total_time: Option<String>,
    pub ingredients: Vec<String>,
    pub ingredient_groups: Vec<IngredientGroup>,
    pub instructions: Vec<String>,
    pub equipment: Vec<String>,
    pub keywords: Vec<String>,
    pub nutrients: BTreeMap<String, String>,
    pub host: Option<String>,
    pub cooking_method: Option<String>,
    pub dietary_restrictions: Option<String>,
    pub canonical_url: Option<String>,
    /// Fields that were absent or failed, in collection order
    pub notes: Vec<FieldNote>,
}

impl RecipeRecord {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            ..Self::default()
        }
    }

    /// Store an accessor's value into the matching slot
    ///
    /// Returns false when the value's shape does not fit the field, which
    /// only happens if a scraper answers with the wrong variant.
    pub fn apply(&mut self, field: Field, value: FieldValue) -> bool {
        match (field, value) {
            (Field::Title, FieldValue::Text(v)) => self.title = v,
            (Field::Yields, FieldValue::Text(v)) => self.yields = Some(v),
            (Field::TotalTime, FieldValue::Text(v)) => self.total_time = Some(v),
            (Field::Ingredients, FieldValue::List(v)) => self.ingredients = v,
            (Field::IngredientGroups, FieldValue::Groups(v)) => self.ingredient_groups = v,
            (Field::Instructions, FieldValue::List(v)) => self.instructions = v,
            (Field::Equipment, FieldValue::List(v)) => self.equipment = v,
            (Field::Keywords, FieldValue::List(v)) => self.keywords = v,
            (Field::Nutrients, FieldValue::Map(v)) => self.nutrients = v,
            (Field::Host, FieldValue::Text(v)) => self.host = Some(v),
            (Field::CookingMethod, FieldValue::Text(v)) => self.cooking_method = Some(v),
            (Field::DietaryRestrictions, FieldValue::Text(v)) => {
                self.dietary_restrictions = Some(v)
            }
            (Field::CanonicalUrl, FieldValue::Text(v)) => self.canonical_url = Some(v),
            _ => return false,
        }
        true
    }

    /// The status recorded for `field`, if it is missing from the record
    pub fn status_of(&self, field: Field) -> Option<&FieldStatus> {
        self.notes
            .iter()
            .find(|note| note.field == field)
            .map(|note| &note.status)
    }

    /// Ingredient groups to render: the scraped groups, or the flat list as one group
    pub fn groups(&self) -> Vec<IngredientGroup> {
        let grouped: Vec<IngredientGroup> = self
            .ingredient_groups
            .iter()
            .filter(|group| !group.items.is_empty())
            .cloned()
            .collect();

        if !grouped.is_empty() {
            grouped
        } else if !self.ingredients.is_empty() {
            vec![IngredientGroup::new(None, self.ingredients.clone())]
        } else {
            Vec::new()
        }
    }
}
