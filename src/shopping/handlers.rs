use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::plan::handlers::monday_of_current_week;
use crate::state::AppState;

use super::dto::{ShoppingListItem, ShoppingListQuery, ShoppingListResponse};
use super::{aggregate_ingredients, format_quantity, ShoppingListSnapshot};

pub fn routes() -> Router<AppState> {
    Router::new().route("/shopping-list/:user_id", get(get_shopping_list))
}

/// Builds (or returns) the shopping list for the user's week: ensures the
/// weekly plan exists, gathers every referenced meal's ingredients,
/// aggregates, and persists one snapshot per (user, week range).
#[instrument(skip(state))]
async fn get_shopping_list(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<ShoppingListQuery>,
) -> Result<Json<ShoppingListResponse>, axum::response::Response> {
    let week_start = q.week_start.unwrap_or_else(monday_of_current_week);
    let week_end = week_start + Duration::days(6);

    let existing = state
        .shopping
        .find_by_user_week(user_id, week_start, week_end)
        .await
        .map_err(internal)?;
    if let Some(snapshot) = existing {
        return Ok(Json(to_response(snapshot)));
    }

    let profile = state
        .profiles
        .get(user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            (StatusCode::NOT_FOUND, "User profile not found".to_string()).into_response()
        })?;
    if !profile.onboarding_completed {
        return Err(
            (StatusCode::BAD_REQUEST, "Onboarding not completed".to_string()).into_response()
        );
    }

    let mut rng = StdRng::from_entropy();
    let plans = state
        .engine
        .build_week(user_id, week_start, &profile, &mut rng)
        .await
        .map_err(IntoResponse::into_response)?;

    let mut ingredient_lists = Vec::new();
    for plan in &plans {
        for meal_id in plan.meal_ids() {
            if let Some(meal) = state.catalog.find_by_id(meal_id).await.map_err(internal)? {
                if !meal.ingredients.is_empty() {
                    ingredient_lists.push(meal.ingredients);
                }
            }
        }
    }
    let aggregated = aggregate_ingredients(&ingredient_lists);

    let snapshot = ShoppingListSnapshot {
        id: Uuid::new_v4(),
        user_id,
        week_start,
        week_end,
        ingredients: aggregated,
        created_at: OffsetDateTime::now_utc(),
    };
    let stored = super::store_snapshot(state.shopping.as_ref(), snapshot)
        .await
        .map_err(internal)?;
    info!(%user_id, %week_start, items = stored.ingredients.len(), "shopping list ready");
    Ok(Json(to_response(stored)))
}

fn to_response(snapshot: ShoppingListSnapshot) -> ShoppingListResponse {
    ShoppingListResponse {
        week_start: snapshot.week_start,
        week_end: snapshot.week_end,
        ingredients: snapshot
            .ingredients
            .into_iter()
            .map(|ingredient| ShoppingListItem {
                display_quantity: format_quantity(ingredient.total_quantity, &ingredient.unit),
                ingredient,
            })
            .collect(),
    }
}

fn internal<E: std::fmt::Display>(e: E) -> axum::response::Response {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
}
