use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::state::AppState;

use super::dto::{OnboardingRequest, OnboardingResponse};
use super::targets::resolve_targets;
use super::{ActivityLevel, Gender, Goal, UserNutritionProfile};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/onboarding/complete", post(complete_onboarding))
        .route("/profile/:user_id", get(get_profile))
}

fn bad_request(msg: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.into())
}

#[instrument(skip(state, body), fields(user_id = %body.user_id))]
async fn complete_onboarding(
    State(state): State<AppState>,
    Json(body): Json<OnboardingRequest>,
) -> Result<Json<OnboardingResponse>, (StatusCode, String)> {
    if !(13..=120).contains(&body.age) {
        return Err(bad_request("age must be between 13 and 120"));
    }
    if !(100.0..=250.0).contains(&body.height_cm) {
        return Err(bad_request("height_cm must be between 100 and 250"));
    }
    if !(30.0..=300.0).contains(&body.weight_kg) {
        return Err(bad_request("weight_kg must be between 30 and 300"));
    }
    let gender = Gender::parse(&body.gender)
        .ok_or_else(|| bad_request(format!("unknown gender: {}", body.gender)))?;
    let goal = Goal::parse(&body.goal)
        .ok_or_else(|| bad_request(format!("unknown goal: {}", body.goal)))?;
    let activity = ActivityLevel::parse(&body.activity_level)
        .ok_or_else(|| bad_request(format!("unknown activity level: {}", body.activity_level)))?;

    let targets = resolve_targets(body.age, body.height_cm, body.weight_kg, gender, goal, activity);
    info!(calories = targets.calories, "resolved nutrition targets");

    let profile = UserNutritionProfile {
        user_id: body.user_id,
        age: body.age,
        height_cm: body.height_cm,
        weight_kg: body.weight_kg,
        gender,
        goal,
        activity_level: activity,
        dietary_preferences: body.dietary_preferences,
        allergies: body.allergies,
        daily_calorie_target: targets.calories,
        protein_target_g: targets.protein_g,
        carb_target_g: targets.carb_g,
        fat_target_g: targets.fat_g,
        onboarding_completed: true,
        updated_at: OffsetDateTime::now_utc(),
    };
    let saved = state.profiles.upsert(&profile).await.map_err(internal)?;
    Ok(Json(OnboardingResponse { profile: saved }))
}

#[instrument(skip(state))]
async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserNutritionProfile>, (StatusCode, String)> {
    match state.profiles.get(user_id).await.map_err(internal)? {
        Some(profile) => Ok(Json(profile)),
        None => Err((StatusCode::NOT_FOUND, "Profile not found".into())),
    }
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
