use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{CatalogStore, Ingredient, MealRecord, MealSlot};

#[derive(Debug, Clone, FromRow)]
struct MealRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    meal_slot: String,
    calories: i32,
    protein_g: f64,
    carbs_g: f64,
    fat_g: f64,
    fiber_g: f64,
    ingredients: Json<Vec<Ingredient>>,
    tags: Vec<String>,
    is_active: bool,
    created_at: OffsetDateTime,
}

impl MealRow {
    fn into_record(self) -> anyhow::Result<MealRecord> {
        let slot = MealSlot::parse(&self.meal_slot)
            .ok_or_else(|| anyhow::anyhow!("unknown meal_slot in catalog: {}", self.meal_slot))?;
        Ok(MealRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            slot,
            calories: self.calories,
            protein_g: self.protein_g,
            carbs_g: self.carbs_g,
            fat_g: self.fat_g,
            fiber_g: self.fiber_g,
            ingredients: self.ingredients.0,
            tags: self.tags,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

const MEAL_COLUMNS: &str = "id, title, description, meal_slot, calories, protein_g, carbs_g, \
     fat_g, fiber_g, ingredients, tags, is_active, created_at";

#[derive(Clone)]
pub struct PgCatalogStore {
    db: PgPool,
}

impl PgCatalogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn insert(&self, meal: &MealRecord) -> anyhow::Result<MealRecord> {
        let row = sqlx::query_as::<_, MealRow>(&format!(
            r#"
            INSERT INTO meals (id, title, description, meal_slot, calories, protein_g,
                               carbs_g, fat_g, fiber_g, ingredients, tags, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(meal.id)
        .bind(&meal.title)
        .bind(&meal.description)
        .bind(meal.slot.as_str())
        .bind(meal.calories)
        .bind(meal.protein_g)
        .bind(meal.carbs_g)
        .bind(meal.fat_g)
        .bind(meal.fiber_g)
        .bind(Json(&meal.ingredients))
        .bind(&meal.tags)
        .bind(meal.is_active)
        .fetch_one(&self.db)
        .await?;
        row.into_record()
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_by_slot(
        &self,
        slot: MealSlot,
        active_only: bool,
    ) -> anyhow::Result<Vec<MealRecord>> {
        let sql = if active_only {
            format!(
                "SELECT {MEAL_COLUMNS} FROM meals WHERE meal_slot = $1 AND is_active ORDER BY created_at"
            )
        } else {
            format!("SELECT {MEAL_COLUMNS} FROM meals WHERE meal_slot = $1 ORDER BY created_at")
        };
        let rows = sqlx::query_as::<_, MealRow>(&sql)
            .bind(slot.as_str())
            .fetch_all(&self.db)
            .await?;
        rows.into_iter().map(MealRow::into_record).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<MealRecord>> {
        let row = sqlx::query_as::<_, MealRow>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(MealRow::into_record).transpose()
    }

    async fn count_by_slot(&self, slot: MealSlot) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meals WHERE meal_slot = $1")
            .bind(slot.as_str())
            .fetch_one(&self.db)
            .await?;
        Ok(count as u64)
    }
}
