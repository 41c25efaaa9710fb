pub mod aggregate;
mod dto;
pub mod handlers;
mod repo;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

pub use aggregate::{aggregate_ingredients, categorize_ingredient, format_quantity};
pub use repo::PgShoppingListStore;

/// Fixed shopping-list taxonomy; display and sort order follow
/// [`IngredientCategory::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientCategory {
    Produce,
    Dairy,
    Meat,
    Seafood,
    Pantry,
    Spices,
    Beverages,
    Frozen,
    Other,
}

impl IngredientCategory {
    pub const ORDER: [IngredientCategory; 9] = [
        IngredientCategory::Produce,
        IngredientCategory::Dairy,
        IngredientCategory::Meat,
        IngredientCategory::Seafood,
        IngredientCategory::Pantry,
        IngredientCategory::Spices,
        IngredientCategory::Beverages,
        IngredientCategory::Frozen,
        IngredientCategory::Other,
    ];

    pub fn sort_rank(self) -> usize {
        Self::ORDER.iter().position(|c| *c == self).unwrap_or(Self::ORDER.len())
    }
}

/// One merged shopping-list line: quantities summed over every occurrence of
/// (normalized name, unit) across the week's meals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedIngredient {
    pub name: String,
    pub total_quantity: f64,
    pub unit: String,
    pub category: IngredientCategory,
}

/// Persisted snapshot of an aggregated list, one per (user, week range).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListSnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week_start: Date,
    pub week_end: Date,
    pub ingredients: Vec<AggregatedIngredient>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait ShoppingListStore: Send + Sync {
    async fn find_by_user_week(
        &self,
        user_id: Uuid,
        week_start: Date,
        week_end: Date,
    ) -> anyhow::Result<Option<ShoppingListSnapshot>>;
    /// Same conflict-as-success contract as plan insertion: `None` means a
    /// concurrent request already stored a snapshot for this key.
    async fn insert(
        &self,
        snapshot: &ShoppingListSnapshot,
    ) -> anyhow::Result<Option<ShoppingListSnapshot>>;
}

/// Persists a freshly aggregated snapshot under the unique (user, week
/// range) key. An insert conflict means a concurrent request stored one
/// first; theirs is returned instead.
pub async fn store_snapshot(
    store: &dyn ShoppingListStore,
    snapshot: ShoppingListSnapshot,
) -> anyhow::Result<ShoppingListSnapshot> {
    match store.insert(&snapshot).await? {
        Some(stored) => Ok(stored),
        None => {
            tracing::info!(
                user_id = %snapshot.user_id, week_start = %snapshot.week_start,
                "duplicate snapshot insert, re-fetching winner"
            );
            store
                .find_by_user_week(snapshot.user_id, snapshot.week_start, snapshot.week_end)
                .await?
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "snapshot insert conflicted but no row found for {} starting {}",
                        snapshot.user_id,
                        snapshot.week_start
                    )
                })
        }
    }
}

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
