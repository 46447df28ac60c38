use anyhow::Context;
use axum::async_trait;
use serde_json::Value;
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::db::PgStore;

/// The slice of a user record that points operations read.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub fcm_token: Option<String>,
    pub points: i64,
    pub total_points: i64,
}

/// A verified payment, keyed by the provider's transaction reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub tx_ref: String,
    pub user_id: Uuid,
    pub amount: f64,
    pub points: i64,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credit {
    Applied { balance: i64 },
    /// The reference was already recorded; nothing changed.
    AlreadyRecorded { balance: i64 },
}

#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn account(&self, user_id: Uuid) -> anyhow::Result<Option<Account>>;
    /// Records the purchase and credits its points, once per `tx_ref`.
    async fn credit_purchase(&self, purchase: &Purchase) -> anyhow::Result<Credit>;
}

#[async_trait]
impl AccountRepo for PgStore {
    async fn account(&self, user_id: Uuid) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, firstname, lastname, fcm_token, points, total_points
            FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn credit_purchase(&self, p: &Purchase) -> anyhow::Result<Credit> {
        let mut tx = self.pool.begin().await.context("begin tx")?;
        let inserted = sqlx::query(
            r#"
            INSERT INTO purchases (tx_ref, user_id, amount, points, data)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (tx_ref) DO NOTHING
            "#,
        )
        .bind(&p.tx_ref)
        .bind(p.user_id)
        .bind(p.amount)
        .bind(p.points)
        .bind(Json(&p.data))
        .execute(&mut *tx)
        .await
        .context("record purchase")?
        .rows_affected()
            == 1;

        let balance: i64 = if inserted {
            sqlx::query_scalar("UPDATE users SET points = points + $2 WHERE id = $1 RETURNING points")
                .bind(p.user_id)
                .bind(p.points)
                .fetch_one(&mut *tx)
                .await
                .context("credit points")?
        } else {
            sqlx::query_scalar("SELECT points FROM users WHERE id = $1")
                .bind(p.user_id)
                .fetch_one(&mut *tx)
                .await?
        };
        tx.commit().await.context("commit tx")?;

        Ok(if inserted {
            Credit::Applied { balance }
        } else {
            Credit::AlreadyRecorded { balance }
        })
    }
}
