use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{AggregatedIngredient, ShoppingListSnapshot, ShoppingListStore};

#[derive(Debug, Clone, FromRow)]
struct SnapshotRow {
    id: Uuid,
    user_id: Uuid,
    week_start: Date,
    week_end: Date,
    ingredients: Json<Vec<AggregatedIngredient>>,
    created_at: OffsetDateTime,
}

impl From<SnapshotRow> for ShoppingListSnapshot {
    fn from(r: SnapshotRow) -> Self {
        ShoppingListSnapshot {
            id: r.id,
            user_id: r.user_id,
            week_start: r.week_start,
            week_end: r.week_end,
            ingredients: r.ingredients.0,
            created_at: r.created_at,
        }
    }
}

const SNAPSHOT_COLUMNS: &str = "id, user_id, week_start, week_end, ingredients, created_at";

#[derive(Clone)]
pub struct PgShoppingListStore {
    db: PgPool,
}

impl PgShoppingListStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ShoppingListStore for PgShoppingListStore {
    async fn find_by_user_week(
        &self,
        user_id: Uuid,
        week_start: Date,
        week_end: Date,
    ) -> anyhow::Result<Option<ShoppingListSnapshot>> {
        let row = sqlx::query_as::<_, SnapshotRow>(&format!(
            r#"
            SELECT {SNAPSHOT_COLUMNS} FROM shopping_lists
            WHERE user_id = $1 AND week_start = $2 AND week_end = $3
            "#
        ))
        .bind(user_id)
        .bind(week_start)
        .bind(week_end)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(ShoppingListSnapshot::from))
    }

    async fn insert(
        &self,
        snapshot: &ShoppingListSnapshot,
    ) -> anyhow::Result<Option<ShoppingListSnapshot>> {
        let row = sqlx::query_as::<_, SnapshotRow>(&format!(
            r#"
            INSERT INTO shopping_lists (id, user_id, week_start, week_end, ingredients)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, week_start, week_end) DO NOTHING
            RETURNING {SNAPSHOT_COLUMNS}
            "#
        ))
        .bind(snapshot.id)
        .bind(snapshot.user_id)
        .bind(snapshot.week_start)
        .bind(snapshot.week_end)
        .bind(Json(&snapshot.ingredients))
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(ShoppingListSnapshot::from))
    }
}
