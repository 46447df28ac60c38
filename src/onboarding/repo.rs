use anyhow::Context;
use axum::async_trait;
use uuid::Uuid;

use super::questions::{Question, QuestionRow};
use crate::db::PgStore;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Answer {
    pub question_number: i32,
    pub answer: String,
}

#[async_trait]
pub trait OnboardingRepo: Send + Sync {
    /// Inserts any question not yet present; existing rows are left alone.
    async fn seed_questions(&self, questions: &[Question]) -> anyhow::Result<()>;
    async fn question(&self, number: i32) -> anyhow::Result<Option<Question>>;
    async fn question_count(&self) -> anyhow::Result<i64>;
    /// All of the user's answers, ordered by question number.
    async fn answers(&self, user_id: Uuid) -> anyhow::Result<Vec<Answer>>;
    /// Returns `false` when an answer for this question already exists.
    async fn insert_answer(&self, user_id: Uuid, number: i32, answer: &str)
        -> anyhow::Result<bool>;
}

#[async_trait]
impl OnboardingRepo for PgStore {
    async fn seed_questions(&self, questions: &[Question]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await.context("begin tx")?;
        for q in questions {
            sqlx::query(
                r#"
                INSERT INTO onboarding_questions
                    (question_number, question_text, question_type, options, is_number_specific)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (question_number) DO NOTHING
                "#,
            )
            .bind(q.question_number)
            .bind(&q.question_text)
            .bind(q.question_type.as_str())
            .bind(q.options.clone().map(sqlx::types::Json))
            .bind(q.is_number_specific)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("seed question {}", q.question_number))?;
        }
        tx.commit().await.context("commit tx")?;
        Ok(())
    }

    async fn question(&self, number: i32) -> anyhow::Result<Option<Question>> {
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT question_number, question_text, question_type, options, is_number_specific
            FROM onboarding_questions
            WHERE question_number = $1
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Question::try_from).transpose()
    }

    async fn question_count(&self) -> anyhow::Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM onboarding_questions")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn answers(&self, user_id: Uuid) -> anyhow::Result<Vec<Answer>> {
        let rows = sqlx::query_as::<_, Answer>(
            r#"
            SELECT question_number, answer
            FROM onboarding_answers
            WHERE user_id = $1
            ORDER BY question_number
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_answer(
        &self,
        user_id: Uuid,
        number: i32,
        answer: &str,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO onboarding_answers (user_id, question_number, answer)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, question_number) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(number)
        .bind(answer)
        .execute(&self.pool)
        .await
        .context("insert onboarding answer")?;
        Ok(res.rows_affected() == 1)
    }
}
