use serde::Deserialize;

use super::Ingredient;

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub title: String,
    pub description: Option<String>,
    pub slot: String,
    pub calories: i32,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
    #[serde(default)]
    pub fiber_g: f64,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ListMealsQuery {
    pub slot: String,
    #[serde(default)]
    pub include_inactive: bool,
}
