use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{ActivityLevel, Gender, Goal, ProfileStore, UserNutritionProfile};

#[derive(Debug, Clone, FromRow)]
struct ProfileRow {
    user_id: Uuid,
    age: i32,
    height_cm: f64,
    weight_kg: f64,
    gender: String,
    goal: String,
    activity_level: String,
    dietary_preferences: Vec<String>,
    allergies: Vec<String>,
    daily_calorie_target: i32,
    protein_target_g: i32,
    carb_target_g: i32,
    fat_target_g: i32,
    onboarding_completed: bool,
    updated_at: OffsetDateTime,
}

impl ProfileRow {
    fn into_profile(self) -> anyhow::Result<UserNutritionProfile> {
        Ok(UserNutritionProfile {
            user_id: self.user_id,
            age: self.age,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            gender: Gender::parse(&self.gender)
                .ok_or_else(|| anyhow::anyhow!("unknown gender: {}", self.gender))?,
            goal: Goal::parse(&self.goal)
                .ok_or_else(|| anyhow::anyhow!("unknown goal: {}", self.goal))?,
            activity_level: ActivityLevel::parse(&self.activity_level)
                .ok_or_else(|| anyhow::anyhow!("unknown activity level: {}", self.activity_level))?,
            dietary_preferences: self.dietary_preferences,
            allergies: self.allergies,
            daily_calorie_target: self.daily_calorie_target,
            protein_target_g: self.protein_target_g,
            carb_target_g: self.carb_target_g,
            fat_target_g: self.fat_target_g,
            onboarding_completed: self.onboarding_completed,
            updated_at: self.updated_at,
        })
    }
}

const PROFILE_COLUMNS: &str = "user_id, age, height_cm, weight_kg, gender, goal, activity_level, \
     dietary_preferences, allergies, daily_calorie_target, protein_target_g, carb_target_g, \
     fat_target_g, onboarding_completed, updated_at";

#[derive(Clone)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<UserNutritionProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        row.map(ProfileRow::into_profile).transpose()
    }

    async fn upsert(&self, profile: &UserNutritionProfile) -> anyhow::Result<UserNutritionProfile> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO user_profiles
                (user_id, age, height_cm, weight_kg, gender, goal, activity_level,
                 dietary_preferences, allergies, daily_calorie_target, protein_target_g,
                 carb_target_g, fat_target_g, onboarding_completed, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, now())
            ON CONFLICT (user_id) DO UPDATE SET
                age = EXCLUDED.age,
                height_cm = EXCLUDED.height_cm,
                weight_kg = EXCLUDED.weight_kg,
                gender = EXCLUDED.gender,
                goal = EXCLUDED.goal,
                activity_level = EXCLUDED.activity_level,
                dietary_preferences = EXCLUDED.dietary_preferences,
                allergies = EXCLUDED.allergies,
                daily_calorie_target = EXCLUDED.daily_calorie_target,
                protein_target_g = EXCLUDED.protein_target_g,
                carb_target_g = EXCLUDED.carb_target_g,
                fat_target_g = EXCLUDED.fat_target_g,
                onboarding_completed = EXCLUDED.onboarding_completed,
                updated_at = now()
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(profile.user_id)
        .bind(profile.age)
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(profile.gender.as_str())
        .bind(profile.goal.as_str())
        .bind(profile.activity_level.as_str())
        .bind(&profile.dietary_preferences)
        .bind(&profile.allergies)
        .bind(profile.daily_calorie_target)
        .bind(profile.protein_target_g)
        .bind(profile.carb_target_g)
        .bind(profile.fat_target_g)
        .bind(profile.onboarding_completed)
        .fetch_one(&self.db)
        .await?;
        row.into_profile()
    }
}
