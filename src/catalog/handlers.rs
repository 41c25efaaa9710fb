use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::state::AppState;

use super::dto::{CreateMealRequest, ListMealsQuery};
use super::{MealRecord, MealSlot};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/:id", get(get_meal))
}

#[instrument(skip(state))]
async fn list_meals(
    State(state): State<AppState>,
    Query(q): Query<ListMealsQuery>,
) -> Result<Json<Vec<MealRecord>>, (StatusCode, String)> {
    let slot = MealSlot::parse(&q.slot)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("unknown meal slot: {}", q.slot)))?;
    let meals = state
        .catalog
        .find_by_slot(slot, !q.include_inactive)
        .await
        .map_err(internal)?;
    Ok(Json(meals))
}

#[instrument(skip(state))]
async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MealRecord>, (StatusCode, String)> {
    match state.catalog.find_by_id(id).await {
        Ok(Some(meal)) => Ok(Json(meal)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Meal not found".into())),
        Err(e) => {
            error!(error = %e, %id, "get_meal failed");
            Err(internal(e))
        }
    }
}

#[instrument(skip(state, body))]
async fn create_meal(
    State(state): State<AppState>,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<MealRecord>), (StatusCode, String)> {
    let slot = MealSlot::parse(&body.slot)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("unknown meal slot: {}", body.slot)))?;
    if body.calories < 0 {
        return Err((StatusCode::BAD_REQUEST, "calories must be non-negative".into()));
    }
    if [body.protein_g, body.carbs_g, body.fat_g, body.fiber_g]
        .iter()
        .any(|g| *g < 0.0)
    {
        return Err((StatusCode::BAD_REQUEST, "macro grams must be non-negative".into()));
    }

    let meal = MealRecord {
        id: Uuid::new_v4(),
        title: body.title,
        description: body.description,
        slot,
        calories: body.calories,
        protein_g: body.protein_g,
        carbs_g: body.carbs_g,
        fat_g: body.fat_g,
        fiber_g: body.fiber_g,
        ingredients: body.ingredients,
        tags: body.tags,
        is_active: body.is_active,
        created_at: OffsetDateTime::now_utc(),
    };
    let created = state.catalog_admin.insert(&meal).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(created)))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
