use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    questions::Question,
    repo::{Answer, OnboardingRepo},
    validate::validate_answer,
};
use crate::{error::AppError, onboarding::units::round1};

/// An [`AppError`] annotated with where the user stands in onboarding.
#[derive(Debug)]
pub struct OnboardingError {
    pub error: AppError,
    pub progress: f64,
    pub next_question: Option<i32>,
}

impl OnboardingError {
    pub(crate) fn new(error: AppError, progress: f64) -> Self {
        Self {
            error,
            progress,
            next_question: None,
        }
    }

    fn out_of_sequence(expected: i32, got: i32, progress: f64) -> Self {
        Self {
            error: AppError::Sequence { expected, got },
            progress,
            next_question: Some(expected),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> axum::http::StatusCode {
        self.error.status()
    }
}

impl From<anyhow::Error> for OnboardingError {
    fn from(e: anyhow::Error) -> Self {
        Self::new(AppError::Internal(e), 0.0)
    }
}

impl IntoResponse for OnboardingError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!(error = %self.error, "onboarding request failed");
        }
        let mut body = json!({
            "error": self.error.to_string(),
            "progress": self.progress,
        });
        if let Some(n) = self.next_question {
            body["next_question"] = json!(n);
        }
        (status, Json(body)).into_response()
    }
}

pub fn next_expected(answers: &[Answer]) -> i32 {
    answers
        .iter()
        .map(|a| a.question_number)
        .max()
        .map_or(0, |n| n + 1)
}

pub fn progress(answered: usize, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round1(answered as f64 / total as f64 * 100.0)
}

#[derive(Debug)]
pub enum Step {
    Ask { question: Question, progress: f64 },
    Complete,
}

#[derive(Debug, PartialEq)]
pub struct Saved {
    pub next_question: i32,
    pub progress: f64,
    pub complete: bool,
}

struct Position {
    expected: i32,
    answered: usize,
    total: i64,
}

impl Position {
    fn progress(&self) -> f64 {
        progress(self.answered, self.total)
    }
}

async fn position(repo: &dyn OnboardingRepo, user_id: Uuid) -> anyhow::Result<Position> {
    let answers = repo.answers(user_id).await?;
    let total = repo.question_count().await?;
    Ok(Position {
        expected: next_expected(&answers),
        answered: answers.len(),
        total,
    })
}

/// Wraps `error` with the user's current progress.
pub async fn reject(repo: &dyn OnboardingRepo, user_id: Uuid, error: AppError) -> OnboardingError {
    let progress = position(repo, user_id)
        .await
        .map(|p| p.progress())
        .unwrap_or_default();
    OnboardingError::new(error, progress)
}

/// Resolves `GET /onboarding?question=n`.
pub async fn current_step(
    repo: &dyn OnboardingRepo,
    user_id: Uuid,
    requested: i32,
) -> Result<Step, OnboardingError> {
    let pos = position(repo, user_id).await?;
    if requested != pos.expected {
        return Err(OnboardingError::out_of_sequence(
            pos.expected,
            requested,
            pos.progress(),
        ));
    }
    match repo.question(requested).await? {
        Some(question) => Ok(Step::Ask {
            question,
            progress: pos.progress(),
        }),
        None => Ok(Step::Complete),
    }
}

/// Validates and records the answer to question `number`.
pub async fn submit_answer(
    repo: &dyn OnboardingRepo,
    user_id: Uuid,
    number: i32,
    answer: &Value,
) -> Result<Saved, OnboardingError> {
    let pos = position(repo, user_id).await?;
    let current = pos.progress();

    if number != pos.expected {
        warn!(user_id = %user_id, expected = pos.expected, got = number, "answer out of sequence");
        return Err(OnboardingError::out_of_sequence(pos.expected, number, current));
    }

    let question = repo.question(number).await?.ok_or_else(|| {
        OnboardingError::new(AppError::NotFound("Question does not exist".into()), current)
    })?;

    let stored = validate_answer(&question, answer).map_err(|e| OnboardingError::new(e, current))?;

    if !repo.insert_answer(user_id, number, &stored).await? {
        // A concurrent submission for the same question got there first.
        warn!(user_id = %user_id, question = number, "duplicate answer");
        return Err(OnboardingError::out_of_sequence(number + 1, number, current));
    }

    let answered = pos.answered + 1;
    info!(user_id = %user_id, question = number, "onboarding answer saved");
    Ok(Saved {
        next_question: number + 1,
        progress: progress(answered, pos.total),
        complete: answered as i64 >= pos.total,
    })
}
