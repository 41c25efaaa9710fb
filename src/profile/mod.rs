mod dto;
pub mod handlers;
mod repo;
pub mod targets;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub use repo::PgProfileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    WeightGain,
    Maintain,
    MuscleGain,
    GeneralHealth,
}

impl Goal {
    pub fn as_str(self) -> &'static str {
        match self {
            Goal::WeightLoss => "weight_loss",
            Goal::WeightGain => "weight_gain",
            Goal::Maintain => "maintain",
            Goal::MuscleGain => "muscle_gain",
            Goal::GeneralHealth => "general_health",
        }
    }

    pub fn parse(s: &str) -> Option<Goal> {
        match s {
            "weight_loss" => Some(Goal::WeightLoss),
            "weight_gain" => Some(Goal::WeightGain),
            "maintain" => Some(Goal::Maintain),
            "muscle_gain" => Some(Goal::MuscleGain),
            "general_health" => Some(Goal::GeneralHealth),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    pub fn parse(s: &str) -> Option<ActivityLevel> {
        match s {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very_active" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }
}

/// Required onboarding input. The non-male branch of Mifflin-St Jeor is used
/// for both `Female` and `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Gender> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNutritionProfile {
    pub user_id: Uuid,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: Gender,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    pub dietary_preferences: Vec<String>,
    pub allergies: Vec<String>,
    pub daily_calorie_target: i32,
    pub protein_target_g: i32,
    pub carb_target_g: i32,
    pub fat_target_g: i32,
    pub onboarding_completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<UserNutritionProfile>>;
    /// Insert or overwrite the profile row; re-running onboarding replaces
    /// the previous answers and derived targets.
    async fn upsert(&self, profile: &UserNutritionProfile) -> anyhow::Result<UserNutritionProfile>;
}

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
