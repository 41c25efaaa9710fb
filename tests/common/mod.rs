//! In-memory store implementations for exercising the plan engine without a
//! database.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use nutriplan::catalog::{CatalogStore, Ingredient, MealRecord, MealSlot};
use nutriplan::plan::{
    DailyPlan, EngineSettings, PlanEngine, PlanStore, RotationLogEntry, RotationStore,
};
use nutriplan::profile::{ActivityLevel, Gender, Goal, UserNutritionProfile};
use nutriplan::shopping::{ShoppingListSnapshot, ShoppingListStore};

pub struct MemCatalog {
    meals: Vec<MealRecord>,
}

impl MemCatalog {
    pub fn new(meals: Vec<MealRecord>) -> Self {
        Self { meals }
    }
}

#[async_trait]
impl CatalogStore for MemCatalog {
    async fn find_by_slot(
        &self,
        slot: MealSlot,
        active_only: bool,
    ) -> anyhow::Result<Vec<MealRecord>> {
        Ok(self
            .meals
            .iter()
            .filter(|m| m.slot == slot && (!active_only || m.is_active))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<MealRecord>> {
        Ok(self.meals.iter().find(|m| m.id == id).cloned())
    }

    async fn count_by_slot(&self, slot: MealSlot) -> anyhow::Result<u64> {
        Ok(self.meals.iter().filter(|m| m.slot == slot).count() as u64)
    }
}

#[derive(Default)]
pub struct MemPlanStore {
    plans: Mutex<Vec<DailyPlan>>,
}

impl MemPlanStore {
    pub fn all(&self) -> Vec<DailyPlan> {
        self.plans.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlanStore for MemPlanStore {
    async fn find_by_user_date(
        &self,
        user_id: Uuid,
        date: time::Date,
    ) -> anyhow::Result<Option<DailyPlan>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id && p.plan_date == date)
            .cloned())
    }

    async fn insert(&self, plan: &DailyPlan) -> anyhow::Result<Option<DailyPlan>> {
        let mut plans = self.plans.lock().unwrap();
        if plans
            .iter()
            .any(|p| p.user_id == plan.user_id && p.plan_date == plan.plan_date)
        {
            return Ok(None);
        }
        plans.push(plan.clone());
        Ok(Some(plan.clone()))
    }
}

/// Plan store that behaves like losing the unique-index race: the initial
/// lookup misses, the insert conflicts, and every later lookup returns the
/// row the concurrent writer got in first.
pub struct ContendedPlanStore {
    winner: DailyPlan,
    lookups: Mutex<u32>,
}

impl ContendedPlanStore {
    pub fn new(winner: DailyPlan) -> Self {
        Self {
            winner,
            lookups: Mutex::new(0),
        }
    }
}

#[async_trait]
impl PlanStore for ContendedPlanStore {
    async fn find_by_user_date(
        &self,
        _user_id: Uuid,
        _date: time::Date,
    ) -> anyhow::Result<Option<DailyPlan>> {
        let mut lookups = self.lookups.lock().unwrap();
        *lookups += 1;
        if *lookups == 1 {
            Ok(None)
        } else {
            Ok(Some(self.winner.clone()))
        }
    }

    async fn insert(&self, _plan: &DailyPlan) -> anyhow::Result<Option<DailyPlan>> {
        Ok(None)
    }
}

#[derive(Default)]
pub struct MemShoppingStore {
    snapshots: Mutex<Vec<ShoppingListSnapshot>>,
}

impl MemShoppingStore {
    pub fn all(&self) -> Vec<ShoppingListSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShoppingListStore for MemShoppingStore {
    async fn find_by_user_week(
        &self,
        user_id: Uuid,
        week_start: time::Date,
        week_end: time::Date,
    ) -> anyhow::Result<Option<ShoppingListSnapshot>> {
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user_id == user_id && s.week_start == week_start && s.week_end == week_end)
            .cloned())
    }

    async fn insert(
        &self,
        snapshot: &ShoppingListSnapshot,
    ) -> anyhow::Result<Option<ShoppingListSnapshot>> {
        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.iter().any(|s| {
            s.user_id == snapshot.user_id
                && s.week_start == snapshot.week_start
                && s.week_end == snapshot.week_end
        }) {
            return Ok(None);
        }
        snapshots.push(snapshot.clone());
        Ok(Some(snapshot.clone()))
    }
}

#[derive(Default)]
pub struct MemRotationStore {
    entries: Mutex<Vec<RotationLogEntry>>,
}

impl MemRotationStore {
    pub fn all(&self) -> Vec<RotationLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RotationStore for MemRotationStore {
    async fn recent_meal_ids(
        &self,
        user_id: Uuid,
        slot: MealSlot,
        as_of: time::Date,
        lookback_days: i64,
    ) -> anyhow::Result<Vec<Uuid>> {
        let newest = as_of - time::Duration::days(1);
        let oldest = as_of - time::Duration::days(lookback_days);
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| {
                e.user_id == user_id
                    && e.slot == slot
                    && e.served_date >= oldest
                    && e.served_date <= newest
            })
            .map(|e| e.meal_id)
            .collect())
    }

    async fn append(&self, entry: &RotationLogEntry) -> anyhow::Result<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

pub fn meal(
    title: &str,
    slot: MealSlot,
    calories: i32,
    tags: &[&str],
    ingredient_names: &[&str],
) -> MealRecord {
    MealRecord {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        slot,
        calories,
        protein_g: 25.0,
        carbs_g: 45.0,
        fat_g: 12.0,
        fiber_g: 6.0,
        ingredients: ingredient_names
            .iter()
            .map(|n| Ingredient {
                name: (*n).to_string(),
                quantity: serde_json::json!(100),
                unit: Some("g".to_string()),
            })
            .collect(),
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
        is_active: true,
        created_at: OffsetDateTime::now_utc(),
    }
}

pub fn complete_profile(user_id: Uuid, daily_calories: i32) -> UserNutritionProfile {
    UserNutritionProfile {
        user_id,
        age: 30,
        height_cm: 178.0,
        weight_kg: 75.0,
        gender: Gender::Male,
        goal: Goal::Maintain,
        activity_level: ActivityLevel::Moderate,
        dietary_preferences: vec![],
        allergies: vec![],
        daily_calorie_target: daily_calories,
        protein_target_g: 150,
        carb_target_g: 200,
        fat_target_g: 65,
        onboarding_completed: true,
        updated_at: OffsetDateTime::now_utc(),
    }
}

pub struct Harness {
    pub engine: PlanEngine,
    pub plans: Arc<MemPlanStore>,
    pub rotation: Arc<MemRotationStore>,
}

pub fn harness(meals: Vec<MealRecord>, settings: EngineSettings) -> Harness {
    let plans = Arc::new(MemPlanStore::default());
    let rotation = Arc::new(MemRotationStore::default());
    let engine = PlanEngine::new(
        Arc::new(MemCatalog::new(meals)),
        plans.clone(),
        rotation.clone(),
        settings,
    );
    Harness {
        engine,
        plans,
        rotation,
    }
}
