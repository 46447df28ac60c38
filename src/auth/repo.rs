use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub points: i64,
    pub total_points: i64,
    pub created_at: OffsetDateTime,
}

const COLUMNS: &str =
    "id, username, email, password_hash, firstname, lastname, points, total_points, created_at";

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub firstname: Option<&'a str>,
    pub lastname: Option<&'a str>,
    pub fcm_token: Option<&'a str>,
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Looks a user up by username or (lowercased) email.
    pub async fn find_by_login(db: &PgPool, login: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE username = $1 OR email = lower($1)"
        ))
        .bind(login)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn taken(db: &PgPool, username: &str, email: &str) -> anyhow::Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(db)
        .await?;
        Ok(taken)
    }

    pub async fn create(db: &PgPool, new: NewUser<'_>) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, firstname, lastname, fcm_token)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new.username)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.firstname)
        .bind(new.lastname)
        .bind(new.fcm_token)
        .fetch_one(db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    /// Absent fields keep their stored values.
    pub async fn update_details(
        db: &PgPool,
        id: Uuid,
        firstname: Option<&str>,
        lastname: Option<&str>,
        fcm_token: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                firstname = COALESCE($2, firstname),
                lastname = COALESCE($3, lastname),
                fcm_token = COALESCE($4, fcm_token)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(firstname)
        .bind(lastname)
        .bind(fcm_token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
