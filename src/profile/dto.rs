use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserNutritionProfile;

/// Onboarding answers. Gender is deliberately required; targets differ by
/// BMR constant and a silent default would skew them.
#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub user_id: Uuid,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: String,
    pub goal: String,
    pub activity_level: String,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub profile: UserNutritionProfile,
}
