//! Ingredient aggregation: normalize, merge duplicates by (name, unit),
//! categorize by keyword, sort by category order then name.

use std::collections::HashMap;

use tracing::warn;

use crate::catalog::Ingredient;

use super::{AggregatedIngredient, IngredientCategory};

/// Keyword table driving categorization. First matching category wins, so
/// row order is significant.
const CATEGORY_KEYWORDS: [(IngredientCategory, &[&str]); 8] = [
    (
        IngredientCategory::Produce,
        &[
            "apple", "banana", "orange", "lettuce", "tomato", "onion", "garlic", "carrot",
            "potato", "broccoli", "spinach", "cucumber", "pepper", "celery", "mushroom",
            "avocado", "lemon", "lime", "herbs", "basil", "parsley", "cilantro", "ginger",
        ],
    ),
    (
        IngredientCategory::Dairy,
        &[
            "milk", "cheese", "butter", "yogurt", "cream", "sour cream", "cottage cheese",
            "mozzarella",
        ],
    ),
    (
        IngredientCategory::Meat,
        &[
            "chicken", "beef", "pork", "turkey", "bacon", "sausage", "ground beef", "steak",
        ],
    ),
    (
        IngredientCategory::Seafood,
        &["fish", "salmon", "tuna", "shrimp", "crab", "lobster", "tilapia"],
    ),
    (
        IngredientCategory::Pantry,
        &[
            "flour", "sugar", "salt", "pepper", "oil", "vinegar", "soy sauce", "pasta", "rice",
            "beans", "lentils", "quinoa", "oats", "bread", "cereal",
        ],
    ),
    (
        IngredientCategory::Spices,
        &[
            "cumin", "paprika", "turmeric", "cinnamon", "nutmeg", "oregano", "thyme", "rosemary",
        ],
    ),
    (
        IngredientCategory::Beverages,
        &["water", "juice", "coffee", "tea", "wine", "beer"],
    ),
    (
        IngredientCategory::Frozen,
        &["frozen vegetables", "frozen fruit", "ice cream"],
    ),
];

pub fn categorize_ingredient(name: &str) -> IngredientCategory {
    let name_lower = name.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| name_lower.contains(k)) {
            return category;
        }
    }
    IngredientCategory::Other
}

/// Quantities arrive as JSON numbers or numeric strings. Anything else is a
/// malformed entry and the caller skips it.
fn parse_quantity(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Merges the ingredient lists of many meals into one categorized, sorted
/// shopping list. Malformed entries are logged and skipped, never fatal;
/// empty input yields an empty list.
pub fn aggregate_ingredients(ingredient_lists: &[Vec<Ingredient>]) -> Vec<AggregatedIngredient> {
    let mut merged: HashMap<(String, String), AggregatedIngredient> = HashMap::new();

    for meal_ingredients in ingredient_lists {
        for ingredient in meal_ingredients {
            let name = ingredient.name.trim().to_lowercase();
            if name.is_empty() {
                continue;
            }
            let Some(quantity) = parse_quantity(&ingredient.quantity) else {
                warn!(
                    ingredient = %ingredient.name,
                    quantity = %ingredient.quantity,
                    "skipping ingredient with unparseable quantity"
                );
                continue;
            };
            let unit = ingredient
                .unit
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .unwrap_or("g")
                .to_string();

            merged
                .entry((name.clone(), unit.clone()))
                .and_modify(|agg| agg.total_quantity += quantity)
                .or_insert_with(|| AggregatedIngredient {
                    category: categorize_ingredient(&name),
                    name,
                    total_quantity: quantity,
                    unit,
                });
        }
    }

    let mut out: Vec<AggregatedIngredient> = merged.into_values().collect();
    out.sort_by(|a, b| {
        a.category
            .sort_rank()
            .cmp(&b.category.sort_rank())
            .then_with(|| a.name.cmp(&b.name))
    });
    out
}

/// Display formatting for the rendered list: grams and milliliters promote
/// to kg/L past 1000, whole quantities drop the decimals.
pub fn format_quantity(quantity: f64, unit: &str) -> String {
    if quantity >= 1000.0 && unit == "g" {
        format!("{:.2} kg", quantity / 1000.0)
    } else if quantity >= 1000.0 && unit == "ml" {
        format!("{:.2} L", quantity / 1000.0)
    } else if quantity.fract() == 0.0 {
        format!("{} {}", quantity as i64, unit)
    } else {
        format!("{quantity:.2} {unit}")
    }
}
