use anyhow::Context;
use axum::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::Booking;
use crate::db::PgStore;

#[async_trait]
pub trait BookingRepo: Send + Sync {
    async fn user_by_email(&self, email: &str) -> anyhow::Result<Option<Uuid>>;
    /// Appends to the user's booking list and bumps its last-updated time.
    async fn append(&self, user_id: Uuid, booking: &Booking) -> anyhow::Result<()>;
    async fn store_unclaimed(&self, booking: &Booking) -> anyhow::Result<()>;
}

#[async_trait]
impl BookingRepo for PgStore {
    async fn user_by_email(&self, email: &str) -> anyhow::Result<Option<Uuid>> {
        let id = sqlx::query_scalar("SELECT id FROM users WHERE email = lower($1) LIMIT 1")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn append(&self, user_id: Uuid, booking: &Booking) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (user_id, bookings, last_updated)
            VALUES ($1, jsonb_build_array($2::jsonb), now())
            ON CONFLICT (user_id) DO UPDATE SET
                bookings = bookings.bookings || EXCLUDED.bookings,
                last_updated = now()
            "#,
        )
        .bind(user_id)
        .bind(Json(booking))
        .execute(&self.pool)
        .await
        .context("append booking")?;
        Ok(())
    }

    async fn store_unclaimed(&self, booking: &Booking) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO unclaimed_bookings (attendee_email, booking) VALUES ($1, $2)",
        )
        .bind(booking.attendee_email.as_deref())
        .bind(Json(booking))
        .execute(&self.pool)
        .await
        .context("store unclaimed booking")?;
        Ok(())
    }
}
