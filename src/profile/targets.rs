//! Calorie and macro target derivation (Mifflin-St Jeor).
//!
//! All tuning knobs live in the const tables below so they can be audited
//! and tested in isolation.

use super::{ActivityLevel, Gender, Goal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NutritionTargets {
    pub calories: i32,
    pub protein_g: i32,
    pub carb_g: i32,
    pub fat_g: i32,
}

/// Absolute minimum daily calorie target.
pub const CALORIE_FLOOR: i32 = 1200;

const ACTIVITY_MULTIPLIERS: [(ActivityLevel, f64); 5] = [
    (ActivityLevel::Sedentary, 1.20),
    (ActivityLevel::Light, 1.375),
    (ActivityLevel::Moderate, 1.55),
    (ActivityLevel::Active, 1.725),
    (ActivityLevel::VeryActive, 1.90),
];

const GOAL_ADJUSTMENTS: [(Goal, f64); 5] = [
    (Goal::WeightLoss, -500.0),
    (Goal::WeightGain, 500.0),
    (Goal::Maintain, 0.0),
    (Goal::MuscleGain, 300.0),
    (Goal::GeneralHealth, 0.0),
];

/// (protein, carb, fat) fractions of total calories, per goal.
const MACRO_RATIOS: [(Goal, (f64, f64, f64)); 5] = [
    (Goal::WeightLoss, (0.35, 0.35, 0.30)),
    (Goal::MuscleGain, (0.30, 0.45, 0.25)),
    (Goal::WeightGain, (0.25, 0.50, 0.25)),
    (Goal::Maintain, (0.30, 0.40, 0.30)),
    (Goal::GeneralHealth, (0.30, 0.40, 0.30)),
];

fn activity_multiplier(level: ActivityLevel) -> f64 {
    ACTIVITY_MULTIPLIERS
        .iter()
        .find(|(l, _)| *l == level)
        .map(|(_, m)| *m)
        .unwrap_or(1.55)
}

fn goal_adjustment(goal: Goal) -> f64 {
    GOAL_ADJUSTMENTS
        .iter()
        .find(|(g, _)| *g == goal)
        .map(|(_, a)| *a)
        .unwrap_or(0.0)
}

pub fn macro_ratios(goal: Goal) -> (f64, f64, f64) {
    MACRO_RATIOS
        .iter()
        .find(|(g, _)| *g == goal)
        .map(|(_, r)| *r)
        .unwrap_or((0.30, 0.40, 0.30))
}

/// Daily calorie target: Mifflin-St Jeor BMR, scaled by activity, shifted by
/// goal, floored at [`CALORIE_FLOOR`].
pub fn calorie_target(
    age: i32,
    height_cm: f64,
    weight_kg: f64,
    gender: Gender,
    goal: Goal,
    activity: ActivityLevel,
) -> i32 {
    let bmr = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age)
        + match gender {
            Gender::Male => 5.0,
            Gender::Female | Gender::Other => -161.0,
        };
    let tee = bmr * activity_multiplier(activity);
    let target = tee + goal_adjustment(goal);
    (target as i32).max(CALORIE_FLOOR)
}

/// Protein/carbs convert at 4 kcal per gram, fat at 9, truncated to whole
/// grams.
pub fn macro_targets(calories: i32, goal: Goal) -> (i32, i32, i32) {
    let (protein_ratio, carb_ratio, fat_ratio) = macro_ratios(goal);
    let calories = f64::from(calories);
    let protein_g = (calories * protein_ratio / 4.0) as i32;
    let carb_g = (calories * carb_ratio / 4.0) as i32;
    let fat_g = (calories * fat_ratio / 9.0) as i32;
    (protein_g, carb_g, fat_g)
}

pub fn resolve_targets(
    age: i32,
    height_cm: f64,
    weight_kg: f64,
    gender: Gender,
    goal: Goal,
    activity: ActivityLevel,
) -> NutritionTargets {
    let calories = calorie_target(age, height_cm, weight_kg, gender, goal, activity);
    let (protein_g, carb_g, fat_g) = macro_targets(calories, goal);
    NutritionTargets {
        calories,
        protein_g,
        carb_g,
        fat_g,
    }
}
