use anyhow::Context;
use axum::async_trait;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::{NutritionPlan, StoredPlan};
use crate::db::PgStore;

#[async_trait]
pub trait PlanRepo: Send + Sync {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<StoredPlan>>;
    /// Stores the plan unless one already exists. Returns whether it was stored.
    async fn insert_if_absent(&self, user_id: Uuid, plan: &NutritionPlan) -> anyhow::Result<bool>;
}

#[derive(Debug, FromRow)]
struct PlanRow {
    plan: Json<NutritionPlan>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PlanRow> for StoredPlan {
    fn from(r: PlanRow) -> Self {
        StoredPlan {
            plan: r.plan.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[async_trait]
impl PlanRepo for PgStore {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<StoredPlan>> {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT plan, created_at, updated_at
            FROM nutrition_plans
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StoredPlan::from))
    }

    async fn insert_if_absent(&self, user_id: Uuid, plan: &NutritionPlan) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO nutrition_plans (user_id, plan)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(Json(plan))
        .execute(&self.pool)
        .await
        .context("insert nutrition plan")?;
        Ok(res.rows_affected() == 1)
    }
}
