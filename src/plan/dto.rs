use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::catalog::MealRecord;

use super::DailyPlan;

#[derive(Debug, Deserialize)]
pub struct DailyPlanQuery {
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyPlanQuery {
    pub week_start: Option<Date>,
}

/// A daily plan with its meal references hydrated from the catalog.
#[derive(Debug, Serialize)]
pub struct DailyPlanResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_date: Date,
    pub breakfast_meal: Option<MealRecord>,
    pub lunch_meal: Option<MealRecord>,
    pub dinner_meal: Option<MealRecord>,
    pub snack_meal: Option<MealRecord>,
    pub total_calories: i32,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
}

#[derive(Debug, Serialize)]
pub struct WeeklyPlanResponse {
    pub week_start: Date,
    pub week_end: Date,
    pub days: Vec<DailyPlanResponse>,
}

impl DailyPlanResponse {
    pub fn from_plan(
        plan: DailyPlan,
        breakfast: Option<MealRecord>,
        lunch: Option<MealRecord>,
        dinner: Option<MealRecord>,
        snack: Option<MealRecord>,
    ) -> Self {
        Self {
            id: plan.id,
            user_id: plan.user_id,
            plan_date: plan.plan_date,
            breakfast_meal: breakfast,
            lunch_meal: lunch,
            dinner_meal: dinner,
            snack_meal: snack,
            total_calories: plan.total_calories,
            total_protein_g: plan.total_protein_g,
            total_carbs_g: plan.total_carbs_g,
            total_fat_g: plan.total_fat_g,
        }
    }
}
