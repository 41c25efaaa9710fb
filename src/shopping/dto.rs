use serde::{Deserialize, Serialize};
use time::Date;

use super::AggregatedIngredient;

#[derive(Debug, Deserialize)]
pub struct ShoppingListQuery {
    pub week_start: Option<Date>,
}

/// The grouped list a downstream renderer (PDF or otherwise) consumes.
#[derive(Debug, Serialize)]
pub struct ShoppingListResponse {
    pub week_start: Date,
    pub week_end: Date,
    pub ingredients: Vec<ShoppingListItem>,
}

#[derive(Debug, Serialize)]
pub struct ShoppingListItem {
    #[serde(flatten)]
    pub ingredient: AggregatedIngredient,
    pub display_quantity: String,
}
