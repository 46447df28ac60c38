use anyhow::Context;
use axum::async_trait;
use sqlx::{Postgres, Transaction};
use time::Date;
use tracing::debug;
use uuid::Uuid;

use super::types::{DailyConsumption, NewMeal, Totals, TrackedMeal};
use crate::db::PgStore;

#[async_trait]
pub trait TrackingRepo: Send + Sync {
    /// Stores the meal and adds it to the day's totals atomically.
    async fn record_meal(&self, user_id: Uuid, meal: &NewMeal) -> anyhow::Result<TrackedMeal>;
    /// Deletes the user's meal and subtracts it from the day's totals
    /// atomically. `None` when the user has no such meal.
    async fn remove_meal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<TrackedMeal>>;
    /// Newest date first.
    async fn list_meals(&self, user_id: Uuid) -> anyhow::Result<Vec<TrackedMeal>>;
    async fn get_meal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<TrackedMeal>>;
    async fn list_consumption(&self, user_id: Uuid) -> anyhow::Result<Vec<DailyConsumption>>;
    async fn get_consumption(
        &self,
        user_id: Uuid,
        date: Date,
    ) -> anyhow::Result<Option<DailyConsumption>>;
}

const MEAL_COLUMNS: &str = "id, name, date, calories, protein, carbs, fats, created_at";

/// Applies `delta` to the day's totals under a row lock. The zero row is
/// inserted first so that concurrent first meals of a day serialize on it.
async fn adjust_day_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    date: Date,
    delta: Totals,
    sign: f64,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO daily_consumption (user_id, date)
        VALUES ($1, $2)
        ON CONFLICT (user_id, date) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(date)
    .execute(&mut **tx)
    .await
    .context("ensure daily consumption")?;

    let current = sqlx::query_as::<_, Totals>(
        r#"
        SELECT total_calories, total_protein, total_carbs, total_fats
        FROM daily_consumption
        WHERE user_id = $1 AND date = $2
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(&mut **tx)
    .await?
    .unwrap_or_default();

    let next = current.apply(delta, sign);
    if next.is_depleted() {
        debug!(user_id = %user_id, %date, "daily consumption emptied");
        sqlx::query("DELETE FROM daily_consumption WHERE user_id = $1 AND date = $2")
            .bind(user_id)
            .bind(date)
            .execute(&mut **tx)
            .await
            .context("delete daily consumption")?;
        return Ok(());
    }

    sqlx::query(
        r#"
        UPDATE daily_consumption SET
            total_calories = $3,
            total_protein = $4,
            total_carbs = $5,
            total_fats = $6,
            updated_at = now()
        WHERE user_id = $1 AND date = $2
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(next.total_calories)
    .bind(next.total_protein)
    .bind(next.total_carbs)
    .bind(next.total_fats)
    .execute(&mut **tx)
    .await
    .context("save daily consumption")?;
    Ok(())
}

#[async_trait]
impl TrackingRepo for PgStore {
    async fn record_meal(&self, user_id: Uuid, meal: &NewMeal) -> anyhow::Result<TrackedMeal> {
        let mut tx = self.pool.begin().await.context("begin tx")?;
        let saved = sqlx::query_as::<_, TrackedMeal>(&format!(
            r#"
            INSERT INTO meal_tracking (user_id, name, date, calories, protein, carbs, fats)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&meal.name)
        .bind(meal.date)
        .bind(meal.calories)
        .bind(meal.protein)
        .bind(meal.carbs)
        .bind(meal.fats)
        .fetch_one(&mut *tx)
        .await
        .context("insert tracked meal")?;
        adjust_day_tx(&mut tx, user_id, meal.date, Totals::of(meal), 1.0).await?;
        tx.commit().await.context("commit tx")?;
        Ok(saved)
    }

    async fn remove_meal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<TrackedMeal>> {
        let mut tx = self.pool.begin().await.context("begin tx")?;
        let meal = sqlx::query_as::<_, TrackedMeal>(&format!(
            r#"
            DELETE FROM meal_tracking
            WHERE id = $1 AND user_id = $2
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("delete tracked meal")?;
        let Some(meal) = meal else {
            return Ok(None);
        };
        adjust_day_tx(&mut tx, user_id, meal.date, meal.totals(), -1.0).await?;
        tx.commit().await.context("commit tx")?;
        Ok(Some(meal))
    }

    async fn list_meals(&self, user_id: Uuid) -> anyhow::Result<Vec<TrackedMeal>> {
        let rows = sqlx::query_as::<_, TrackedMeal>(&format!(
            r#"
            SELECT {MEAL_COLUMNS}
            FROM meal_tracking
            WHERE user_id = $1
            ORDER BY date DESC, created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_meal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<TrackedMeal>> {
        let row = sqlx::query_as::<_, TrackedMeal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meal_tracking WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_consumption(&self, user_id: Uuid) -> anyhow::Result<Vec<DailyConsumption>> {
        let rows = sqlx::query_as::<_, DailyConsumption>(
            r#"
            SELECT date, total_calories, total_protein, total_carbs, total_fats
            FROM daily_consumption
            WHERE user_id = $1
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_consumption(
        &self,
        user_id: Uuid,
        date: Date,
    ) -> anyhow::Result<Option<DailyConsumption>> {
        let row = sqlx::query_as::<_, DailyConsumption>(
            r#"
            SELECT date, total_calories, total_protein, total_carbs, total_fats
            FROM daily_consumption
            WHERE user_id = $1 AND date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
