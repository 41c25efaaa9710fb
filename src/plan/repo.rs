use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::{Date, Duration, OffsetDateTime};
use uuid::Uuid;

use crate::catalog::MealSlot;

use super::{DailyPlan, PlanStore, RotationLogEntry, RotationStore};

#[derive(Debug, Clone, FromRow)]
struct PlanRow {
    id: Uuid,
    user_id: Uuid,
    plan_date: Date,
    breakfast_meal_id: Option<Uuid>,
    lunch_meal_id: Option<Uuid>,
    dinner_meal_id: Option<Uuid>,
    snack_meal_id: Option<Uuid>,
    total_calories: i32,
    total_protein_g: f64,
    total_carbs_g: f64,
    total_fat_g: f64,
    created_at: OffsetDateTime,
}

impl From<PlanRow> for DailyPlan {
    fn from(r: PlanRow) -> Self {
        DailyPlan {
            id: r.id,
            user_id: r.user_id,
            plan_date: r.plan_date,
            breakfast_meal_id: r.breakfast_meal_id,
            lunch_meal_id: r.lunch_meal_id,
            dinner_meal_id: r.dinner_meal_id,
            snack_meal_id: r.snack_meal_id,
            total_calories: r.total_calories,
            total_protein_g: r.total_protein_g,
            total_carbs_g: r.total_carbs_g,
            total_fat_g: r.total_fat_g,
            created_at: r.created_at,
        }
    }
}

const PLAN_COLUMNS: &str = "id, user_id, plan_date, breakfast_meal_id, lunch_meal_id, \
     dinner_meal_id, snack_meal_id, total_calories, total_protein_g, total_carbs_g, \
     total_fat_g, created_at";

#[derive(Clone)]
pub struct PgPlanStore {
    db: PgPool,
}

impl PgPlanStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn find_by_user_date(
        &self,
        user_id: Uuid,
        date: Date,
    ) -> anyhow::Result<Option<DailyPlan>> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM daily_plans WHERE user_id = $1 AND plan_date = $2"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(DailyPlan::from))
    }

    async fn insert(&self, plan: &DailyPlan) -> anyhow::Result<Option<DailyPlan>> {
        // ON CONFLICT DO NOTHING makes the unique (user_id, plan_date) index
        // the arbiter of concurrent first requests; a missing returned row
        // means another writer won.
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            INSERT INTO daily_plans
                (id, user_id, plan_date, breakfast_meal_id, lunch_meal_id, dinner_meal_id,
                 snack_meal_id, total_calories, total_protein_g, total_carbs_g, total_fat_g)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, plan_date) DO NOTHING
            RETURNING {PLAN_COLUMNS}
            "#
        ))
        .bind(plan.id)
        .bind(plan.user_id)
        .bind(plan.plan_date)
        .bind(plan.breakfast_meal_id)
        .bind(plan.lunch_meal_id)
        .bind(plan.dinner_meal_id)
        .bind(plan.snack_meal_id)
        .bind(plan.total_calories)
        .bind(plan.total_protein_g)
        .bind(plan.total_carbs_g)
        .bind(plan.total_fat_g)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(DailyPlan::from))
    }
}

#[derive(Clone)]
pub struct PgRotationStore {
    db: PgPool,
}

impl PgRotationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RotationStore for PgRotationStore {
    async fn recent_meal_ids(
        &self,
        user_id: Uuid,
        slot: MealSlot,
        as_of: Date,
        lookback_days: i64,
    ) -> anyhow::Result<Vec<Uuid>> {
        // Yesterday back through `lookback_days` days ago, inclusive.
        let newest = as_of - Duration::days(1);
        let oldest = as_of - Duration::days(lookback_days);
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT meal_id FROM meal_rotation_log
            WHERE user_id = $1 AND meal_slot = $2 AND served_date BETWEEN $3 AND $4
            "#,
        )
        .bind(user_id)
        .bind(slot.as_str())
        .bind(oldest)
        .bind(newest)
        .fetch_all(&self.db)
        .await?;
        Ok(ids)
    }

    async fn append(&self, entry: &RotationLogEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meal_rotation_log (user_id, meal_id, meal_slot, served_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.meal_id)
        .bind(entry.slot.as_str())
        .bind(entry.served_date)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
