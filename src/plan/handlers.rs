use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use time::{Date, Duration, OffsetDateTime};
use tracing::instrument;
use uuid::Uuid;

use crate::catalog::{CatalogStore, MealRecord};
use crate::profile::UserNutritionProfile;
use crate::state::AppState;

use super::dto::{DailyPlanQuery, DailyPlanResponse, WeeklyPlanQuery, WeeklyPlanResponse};
use super::DailyPlan;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans/today/:user_id", get(get_today_plan))
        .route("/plans/daily/:user_id", get(get_daily_plan))
        .route("/plans/weekly/:user_id", get(get_weekly_plan))
}

async fn load_complete_profile(
    state: &AppState,
    user_id: Uuid,
) -> Result<UserNutritionProfile, (StatusCode, String)> {
    let profile = state
        .profiles
        .get(user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "User profile not found".to_string()))?;
    if !profile.onboarding_completed {
        return Err((StatusCode::BAD_REQUEST, "Onboarding not completed".into()));
    }
    Ok(profile)
}

async fn hydrate(
    catalog: &dyn CatalogStore,
    plan: DailyPlan,
) -> Result<DailyPlanResponse, (StatusCode, String)> {
    async fn load(
        catalog: &dyn CatalogStore,
        id: Option<Uuid>,
    ) -> Result<Option<MealRecord>, (StatusCode, String)> {
        match id {
            Some(id) => catalog.find_by_id(id).await.map_err(internal),
            None => Ok(None),
        }
    }

    let breakfast = load(catalog, plan.breakfast_meal_id).await?;
    let lunch = load(catalog, plan.lunch_meal_id).await?;
    let dinner = load(catalog, plan.dinner_meal_id).await?;
    let snack = load(catalog, plan.snack_meal_id).await?;
    Ok(DailyPlanResponse::from_plan(plan, breakfast, lunch, dinner, snack))
}

#[instrument(skip(state))]
async fn get_today_plan(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<DailyPlanResponse>, axum::response::Response> {
    build_daily(state, user_id, OffsetDateTime::now_utc().date()).await
}

#[instrument(skip(state))]
async fn get_daily_plan(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<DailyPlanQuery>,
) -> Result<Json<DailyPlanResponse>, axum::response::Response> {
    let date = q.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    build_daily(state, user_id, date).await
}

async fn build_daily(
    state: AppState,
    user_id: Uuid,
    date: Date,
) -> Result<Json<DailyPlanResponse>, axum::response::Response> {
    use axum::response::IntoResponse;

    let profile = load_complete_profile(&state, user_id)
        .await
        .map_err(IntoResponse::into_response)?;
    let mut rng = StdRng::from_entropy();
    let plan = state
        .engine
        .build_or_get(user_id, date, &profile, &mut rng)
        .await
        .map_err(IntoResponse::into_response)?;
    let hydrated = hydrate(state.catalog.as_ref(), plan)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(hydrated))
}

#[instrument(skip(state))]
async fn get_weekly_plan(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<WeeklyPlanQuery>,
) -> Result<Json<WeeklyPlanResponse>, axum::response::Response> {
    use axum::response::IntoResponse;

    let profile = load_complete_profile(&state, user_id)
        .await
        .map_err(IntoResponse::into_response)?;
    let week_start = q.week_start.unwrap_or_else(monday_of_current_week);
    let week_end = week_start + Duration::days(6);

    let mut rng = StdRng::from_entropy();
    let plans = state
        .engine
        .build_week(user_id, week_start, &profile, &mut rng)
        .await
        .map_err(IntoResponse::into_response)?;

    let mut days = Vec::with_capacity(plans.len());
    for plan in plans {
        days.push(
            hydrate(state.catalog.as_ref(), plan)
                .await
                .map_err(IntoResponse::into_response)?,
        );
    }
    Ok(Json(WeeklyPlanResponse {
        week_start,
        week_end,
        days,
    }))
}

pub fn monday_of_current_week() -> Date {
    let today = OffsetDateTime::now_utc().date();
    today - Duration::days(i64::from(today.weekday().number_days_from_monday()))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
