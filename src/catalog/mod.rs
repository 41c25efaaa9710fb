mod dto;
pub mod handlers;
mod repo;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub use repo::PgCatalogStore;

/// The four daily plan positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }

    pub fn parse(s: &str) -> Option<MealSlot> {
        match s {
            "breakfast" => Some(MealSlot::Breakfast),
            "lunch" => Some(MealSlot::Lunch),
            "dinner" => Some(MealSlot::Dinner),
            "snack" => Some(MealSlot::Snack),
            _ => None,
        }
    }
}

/// One line of a meal's ingredient list. Quantities arrive from catalog
/// management as either numbers or strings ("2", "1.5"); the shopping-list
/// aggregator is the one place that parses them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: serde_json::Value,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub slot: MealSlot,
    pub calories: i32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub ingredients: Vec<Ingredient>,
    pub tags: Vec<String>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Read access to the meal catalog. The engine never mutates catalog
/// entries; lifecycle belongs to catalog management.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_slot(&self, slot: MealSlot, active_only: bool)
        -> anyhow::Result<Vec<MealRecord>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<MealRecord>>;
    async fn count_by_slot(&self, slot: MealSlot) -> anyhow::Result<u64>;
}

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
