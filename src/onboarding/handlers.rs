use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use super::{
    dto::{AnswerSavedResponse, CompletedResponse, QuestionQuery, QuestionResponse, SubmitAnswerRequest},
    services::{self, OnboardingError, Step},
};
use crate::{auth::AuthUser, error::AppError, profile, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/onboarding", get(get_question).post(submit_answer))
}

#[instrument(skip(state))]
pub async fn get_question(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<QuestionQuery>,
) -> Result<Response, OnboardingError> {
    let requested = match q.question.as_deref().map(str::trim) {
        None | Some("") => 0,
        Some(raw) => match raw.parse::<i32>() {
            Ok(n) => n,
            Err(_) => {
                let e = AppError::validation("question", "Question parameter must be an integer");
                return Err(services::reject(state.onboarding.as_ref(), user_id, e).await);
            }
        },
    };

    match services::current_step(state.onboarding.as_ref(), user_id, requested).await? {
        Step::Ask { question, progress } => {
            Ok(Json(QuestionResponse { question, progress }).into_response())
        }
        Step::Complete => {
            if let Err(e) = profile::services::ensure_profile(&state, user_id).await {
                error!(error = %e, user_id = %user_id, "profile derivation failed");
            }
            Ok(Json(CompletedResponse {
                stop: true,
                message: "Onboarding completed",
                progress: 100.0,
            })
            .into_response())
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn submit_answer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<(StatusCode, Json<AnswerSavedResponse>), OnboardingError> {
    let number = match payload.question.as_i64().and_then(|n| i32::try_from(n).ok()) {
        Some(n) => n,
        None => {
            let e = AppError::validation("question", "Question number must be an integer");
            return Err(services::reject(state.onboarding.as_ref(), user_id, e).await);
        }
    };

    let saved =
        services::submit_answer(state.onboarding.as_ref(), user_id, number, &payload.answer)
            .await?;

    if saved.complete {
        if let Err(e) = profile::services::derive_if_complete(&state, user_id).await {
            error!(error = %e, user_id = %user_id, "profile derivation failed");
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(AnswerSavedResponse {
            message: "Answer saved successfully",
            next_question: saved.next_question,
            progress: saved.progress,
        }),
    ))
}
