//! Daily and weekly plan generation. Find-or-generate semantics: at most one
//! plan per (user, date), with the storage layer's uniqueness constraint as
//! the backstop for concurrent first requests.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use time::{Date, Duration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{CatalogStore, MealRecord, MealSlot};
use crate::error::PlanError;
use crate::profile::UserNutritionProfile;

use super::selector::select_meal;
use super::{DailyPlan, PlanStore, RotationLogEntry, RotationStore};

/// Share of the daily calorie target per slot.
const SLOT_SHARES: [(MealSlot, f64); 4] = [
    (MealSlot::Breakfast, 0.25),
    (MealSlot::Lunch, 0.35),
    (MealSlot::Dinner, 0.30),
    (MealSlot::Snack, 0.10),
];

/// Splits the daily target across the four slots (integer truncation).
pub fn distribute_calories(daily_target: i32) -> [(MealSlot, i32); 4] {
    SLOT_SHARES.map(|(slot, share)| (slot, (f64::from(daily_target) * share) as i32))
}

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// When true (the default), filter relaxation on an over-constrained
    /// pool never serves a meal matching a stated allergy; the slot stays
    /// empty instead.
    pub strict_allergy_enforcement: bool,
    pub lookback_days: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            strict_allergy_enforcement: true,
            lookback_days: 7,
        }
    }
}

pub struct PlanEngine {
    catalog: Arc<dyn CatalogStore>,
    plans: Arc<dyn PlanStore>,
    rotation: Arc<dyn RotationStore>,
    settings: EngineSettings,
}

impl PlanEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        plans: Arc<dyn PlanStore>,
        rotation: Arc<dyn RotationStore>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            catalog,
            plans,
            rotation,
            settings,
        }
    }

    /// Returns the existing plan for (user, date) or generates, persists and
    /// returns a new one. Rotation log entries are appended only after the
    /// plan row is durably inserted, and only by the inserting request.
    pub async fn build_or_get<R: Rng>(
        &self,
        user_id: Uuid,
        plan_date: Date,
        profile: &UserNutritionProfile,
        rng: &mut R,
    ) -> Result<DailyPlan, PlanError> {
        if !profile.onboarding_completed {
            return Err(PlanError::ProfileIncomplete);
        }

        if let Some(existing) = self.plans.find_by_user_date(user_id, plan_date).await? {
            debug!(%user_id, %plan_date, plan = %existing.id, "returning existing plan");
            return Ok(existing);
        }

        let mut selections: Vec<(MealSlot, Option<MealRecord>)> = Vec::with_capacity(4);
        for (slot, target) in distribute_calories(profile.daily_calorie_target) {
            let recent: HashSet<Uuid> = self
                .rotation
                .recent_meal_ids(user_id, slot, plan_date, self.settings.lookback_days)
                .await?
                .into_iter()
                .collect();
            let picked = select_meal(
                self.catalog.as_ref(),
                slot,
                profile,
                target,
                &HashSet::new(),
                &recent,
                self.settings.strict_allergy_enforcement,
                rng,
            )
            .await?;
            if picked.is_none() {
                warn!(%user_id, slot = slot.as_str(), "no meal selected for slot");
            }
            selections.push((slot, picked));
        }

        if selections.iter().all(|(_, m)| m.is_none()) {
            return Err(PlanError::CatalogExhausted {
                breakfast: self.catalog.count_by_slot(MealSlot::Breakfast).await?,
                lunch: self.catalog.count_by_slot(MealSlot::Lunch).await?,
                dinner: self.catalog.count_by_slot(MealSlot::Dinner).await?,
                snack: self.catalog.count_by_slot(MealSlot::Snack).await?,
            });
        }

        let mut plan = DailyPlan {
            id: Uuid::new_v4(),
            user_id,
            plan_date,
            breakfast_meal_id: None,
            lunch_meal_id: None,
            dinner_meal_id: None,
            snack_meal_id: None,
            total_calories: 0,
            total_protein_g: 0.0,
            total_carbs_g: 0.0,
            total_fat_g: 0.0,
            created_at: OffsetDateTime::now_utc(),
        };
        for (slot, meal) in &selections {
            let Some(meal) = meal else { continue };
            match slot {
                MealSlot::Breakfast => plan.breakfast_meal_id = Some(meal.id),
                MealSlot::Lunch => plan.lunch_meal_id = Some(meal.id),
                MealSlot::Dinner => plan.dinner_meal_id = Some(meal.id),
                MealSlot::Snack => plan.snack_meal_id = Some(meal.id),
            }
            plan.total_calories += meal.calories;
            plan.total_protein_g += meal.protein_g;
            plan.total_carbs_g += meal.carbs_g;
            plan.total_fat_g += meal.fat_g;
        }

        let Some(inserted) = self.plans.insert(&plan).await? else {
            // Lost the race against a concurrent first request. The winner
            // already logged rotation; just return its plan.
            info!(%user_id, %plan_date, "duplicate plan insert, re-fetching winner");
            return self
                .plans
                .find_by_user_date(user_id, plan_date)
                .await?
                .ok_or_else(|| {
                    PlanError::Storage(anyhow::anyhow!(
                        "plan insert conflicted but no row found for {user_id} on {plan_date}"
                    ))
                });
        };

        for (slot, meal) in &selections {
            if let Some(meal) = meal {
                self.rotation
                    .append(&RotationLogEntry {
                        user_id,
                        meal_id: meal.id,
                        slot: *slot,
                        served_date: plan_date,
                    })
                    .await?;
            }
        }

        info!(
            %user_id, %plan_date, plan = %inserted.id,
            calories = inserted.total_calories, "daily plan generated"
        );
        Ok(inserted)
    }

    /// Seven sequential daily plans starting at `week_start`. Not atomic:
    /// a mid-week failure leaves earlier days persisted, and per-day
    /// idempotence makes retrying the whole week safe.
    pub async fn build_week<R: Rng>(
        &self,
        user_id: Uuid,
        week_start: Date,
        profile: &UserNutritionProfile,
        rng: &mut R,
    ) -> Result<Vec<DailyPlan>, PlanError> {
        let mut plans = Vec::with_capacity(7);
        for offset in 0..7 {
            let date = week_start + Duration::days(offset);
            plans.push(self.build_or_get(user_id, date, profile, rng).await?);
        }
        Ok(plans)
    }
}
