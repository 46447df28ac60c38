use anyhow::Context;
use axum::async_trait;
use serde_json::Value;
use sqlx::types::Json;

use super::Landing;
use crate::db::PgStore;

#[async_trait]
pub trait LandingRepo: Send + Sync {
    /// Replaces whatever was stored for `(landing, day)`.
    async fn upsert(&self, landing: Landing, day: &str, content: &Value) -> anyhow::Result<()>;
}

#[async_trait]
impl LandingRepo for PgStore {
    async fn upsert(&self, landing: Landing, day: &str, content: &Value) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO landings (kind, day, content)
            VALUES ($1, $2, $3)
            ON CONFLICT (kind, day) DO UPDATE SET content = EXCLUDED.content, updated_at = now()
            "#,
        )
        .bind(landing.as_str())
        .bind(day)
        .bind(Json(content))
        .execute(&self.pool)
        .await
        .context("upsert landing")?;
        Ok(())
    }
}
