//! Picks one catalog meal for a slot: dietary and allergy filtering, a
//! calorie band around the slot target, and a preference for meals not
//! served within the rotation lookback window.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::{CatalogStore, MealRecord, MealSlot};
use crate::profile::UserNutritionProfile;

/// Calorie tolerance around the per-slot target (fraction of target).
const CALORIE_BAND: f64 = 0.20;
/// When nothing lands in the band, fall back to this many closest meals.
const CLOSEST_FALLBACK: usize = 5;

fn has_tag(meal: &MealRecord, tag: &str) -> bool {
    meal.tags.iter().any(|t| t == tag)
}

/// Dietary preference filters. The set is fixed: "vegetarian", "vegan",
/// "keto" and "paleo"; unrecognized preference strings are no-ops.
pub fn apply_diet_filters(mut meals: Vec<MealRecord>, preferences: &[String]) -> Vec<MealRecord> {
    let prefs: HashSet<&str> = preferences.iter().map(String::as_str).collect();

    if prefs.contains("vegetarian") {
        meals.retain(|m| !has_tag(m, "meat") && !has_tag(m, "fish") && !has_tag(m, "poultry"));
    }
    if prefs.contains("vegan") {
        meals.retain(|m| {
            !has_tag(m, "dairy")
                && !has_tag(m, "eggs")
                && !has_tag(m, "meat")
                && !has_tag(m, "fish")
                && !has_tag(m, "poultry")
        });
    }
    if prefs.contains("keto") {
        meals.retain(|m| has_tag(m, "keto"));
    }
    if prefs.contains("paleo") {
        meals.retain(|m| has_tag(m, "paleo"));
    }
    meals
}

/// Drops meals whose tag set or ingredient names match any stated allergy.
/// Tag and ingredient-name comparison is case-insensitive exact match.
pub fn apply_allergy_filter(mut meals: Vec<MealRecord>, allergies: &[String]) -> Vec<MealRecord> {
    for allergy in allergies {
        meals.retain(|m| {
            let tag_hit = m.tags.iter().any(|t| t.eq_ignore_ascii_case(allergy));
            let ingredient_hit = m
                .ingredients
                .iter()
                .any(|i| i.name.eq_ignore_ascii_case(allergy));
            !tag_hit && !ingredient_hit
        });
    }
    meals
}

/// Meals within ±20% of the target; when the band is empty, the
/// [`CLOSEST_FALLBACK`] meals nearest by absolute calorie distance.
pub fn calorie_shortlist(meals: Vec<MealRecord>, target_calories: i32) -> Vec<MealRecord> {
    let min = (f64::from(target_calories) * (1.0 - CALORIE_BAND)) as i32;
    let max = (f64::from(target_calories) * (1.0 + CALORIE_BAND)) as i32;

    let in_band: Vec<MealRecord> = meals
        .iter()
        .filter(|m| (min..=max).contains(&m.calories))
        .cloned()
        .collect();
    if !in_band.is_empty() {
        return in_band;
    }

    let mut by_distance = meals;
    by_distance.sort_by_key(|m| (m.calories - target_calories).abs());
    by_distance.truncate(CLOSEST_FALLBACK);
    by_distance
}

/// Sub-preference for meals outside the recent rotation window; ignored when
/// it would empty the shortlist.
pub fn prefer_unrecent(shortlist: Vec<MealRecord>, recent: &HashSet<Uuid>) -> Vec<MealRecord> {
    let fresh: Vec<MealRecord> = shortlist
        .iter()
        .filter(|m| !recent.contains(&m.id))
        .cloned()
        .collect();
    if fresh.is_empty() {
        shortlist
    } else {
        fresh
    }
}

/// Selects one meal for the slot, or `None` when the catalog (after the
/// configured fallbacks) has nothing to offer.
#[allow(clippy::too_many_arguments)]
pub async fn select_meal<R: Rng>(
    catalog: &dyn CatalogStore,
    slot: MealSlot,
    profile: &UserNutritionProfile,
    target_calories: i32,
    excluded: &HashSet<Uuid>,
    recent: &HashSet<Uuid>,
    strict_allergy_enforcement: bool,
    rng: &mut R,
) -> anyhow::Result<Option<MealRecord>> {
    let mut pool = catalog.find_by_slot(slot, true).await?;
    if pool.is_empty() {
        warn!(slot = slot.as_str(), "no active meals for slot, including inactive");
        pool = catalog.find_by_slot(slot, false).await?;
    }
    if pool.is_empty() {
        return Ok(None);
    }

    let mut candidates = apply_diet_filters(pool.clone(), &profile.dietary_preferences);
    candidates = apply_allergy_filter(candidates, &profile.allergies);
    candidates.retain(|m| !excluded.contains(&m.id));

    if candidates.is_empty() {
        if strict_allergy_enforcement {
            // Diet preferences may be relaxed; allergies never are. A slot
            // can legitimately come back empty here.
            warn!(
                slot = slot.as_str(),
                "filters emptied the pool, relaxing diet preferences only"
            );
            candidates = apply_allergy_filter(pool.clone(), &profile.allergies);
            candidates.retain(|m| !excluded.contains(&m.id));
            if candidates.is_empty() {
                return Ok(None);
            }
        } else {
            warn!(
                slot = slot.as_str(),
                "filters emptied the pool, falling back to unfiltered catalog"
            );
            candidates = pool.clone();
            candidates.retain(|m| !excluded.contains(&m.id));
            if candidates.is_empty() {
                candidates = pool;
            }
        }
    }

    let shortlist = calorie_shortlist(candidates, target_calories);
    let shortlist = prefer_unrecent(shortlist, recent);
    let picked = shortlist.choose(rng).cloned();
    if let Some(meal) = &picked {
        debug!(slot = slot.as_str(), meal = %meal.id, calories = meal.calories, "selected meal");
    }
    Ok(picked)
}
