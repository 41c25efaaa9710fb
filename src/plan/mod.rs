pub mod builder;
mod dto;
pub mod handlers;
mod repo;
pub mod selector;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::catalog::MealSlot;

pub use builder::{EngineSettings, PlanEngine};
pub use repo::{PgPlanStore, PgRotationStore};

/// One generated plan per (user, calendar date). Never mutated after
/// creation; regeneration returns the stored row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_date: Date,
    pub breakfast_meal_id: Option<Uuid>,
    pub lunch_meal_id: Option<Uuid>,
    pub dinner_meal_id: Option<Uuid>,
    pub snack_meal_id: Option<Uuid>,
    pub total_calories: i32,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl DailyPlan {
    pub fn meal_id(&self, slot: MealSlot) -> Option<Uuid> {
        match slot {
            MealSlot::Breakfast => self.breakfast_meal_id,
            MealSlot::Lunch => self.lunch_meal_id,
            MealSlot::Dinner => self.dinner_meal_id,
            MealSlot::Snack => self.snack_meal_id,
        }
    }

    pub fn meal_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        MealSlot::ALL.into_iter().filter_map(|s| self.meal_id(s))
    }
}

/// Append-only fact: this meal was served to this user in this slot on this
/// date. Only ever read back as a lookback window for repeat avoidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationLogEntry {
    pub user_id: Uuid,
    pub meal_id: Uuid,
    pub slot: MealSlot,
    pub served_date: Date,
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn find_by_user_date(&self, user_id: Uuid, date: Date)
        -> anyhow::Result<Option<DailyPlan>>;
    /// Inserts the plan, honoring the (user_id, plan_date) uniqueness
    /// constraint. Returns `None` when a concurrent request already inserted
    /// a plan for this key; callers re-fetch instead of failing.
    async fn insert(&self, plan: &DailyPlan) -> anyhow::Result<Option<DailyPlan>>;
}

#[async_trait]
pub trait RotationStore: Send + Sync {
    /// Meal ids served to the user in this slot within
    /// `as_of - lookback_days ..= as_of - 1`.
    async fn recent_meal_ids(
        &self,
        user_id: Uuid,
        slot: MealSlot,
        as_of: Date,
        lookback_days: i64,
    ) -> anyhow::Result<Vec<Uuid>>;
    async fn append(&self, entry: &RotationLogEntry) -> anyhow::Result<()>;
}

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
