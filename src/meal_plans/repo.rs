use anyhow::Context;
use axum::async_trait;
use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::types::{DailyMealPlan, MealPlan};
use crate::db::PgStore;

#[async_trait]
pub trait MealPlanRepo: Send + Sync {
    async fn get(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<DailyMealPlan>>;
    /// Newest date first.
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<DailyMealPlan>>;
    async fn insert_if_absent(
        &self,
        user_id: Uuid,
        date: Date,
        stage_number: i32,
        plan: &MealPlan,
    ) -> anyhow::Result<bool>;
}

#[derive(Debug, FromRow)]
struct MealPlanRow {
    date: Date,
    stage_number: i32,
    plan: Json<MealPlan>,
    created_at: OffsetDateTime,
}

impl From<MealPlanRow> for DailyMealPlan {
    fn from(r: MealPlanRow) -> Self {
        DailyMealPlan {
            date: r.date,
            stage_number: r.stage_number,
            plan: r.plan.0,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl MealPlanRepo for PgStore {
    async fn get(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<DailyMealPlan>> {
        let row = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT date, stage_number, plan, created_at
            FROM daily_meal_plans
            WHERE user_id = $1 AND date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(DailyMealPlan::from))
    }

    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<DailyMealPlan>> {
        let rows = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT date, stage_number, plan, created_at
            FROM daily_meal_plans
            WHERE user_id = $1
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(DailyMealPlan::from).collect())
    }

    async fn insert_if_absent(
        &self,
        user_id: Uuid,
        date: Date,
        stage_number: i32,
        plan: &MealPlan,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO daily_meal_plans (user_id, date, stage_number, plan)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, date) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(stage_number)
        .bind(Json(plan))
        .execute(&self.pool)
        .await
        .context("insert daily meal plan")?;
        Ok(res.rows_affected() == 1)
    }
}
