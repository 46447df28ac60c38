//! Free-form generation by schema name and the daily landing pages.

pub mod repo;

use axum::{extract::State, routing::{get, post}, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use time::{macros::format_description, OffsetDateTime, UtcOffset};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::AppError,
    genai::{ContentKind, GenerationRequest},
    state::AppState,
};

pub use repo::LandingRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Fitness,
    Mindfulness,
    Nutrition,
}

impl Landing {
    pub fn as_str(self) -> &'static str {
        match self {
            Landing::Fitness => "fitness",
            Landing::Mindfulness => "mindfulness",
            Landing::Nutrition => "nutrition",
        }
    }

    pub fn kind(self) -> ContentKind {
        match self {
            Landing::Fitness => ContentKind::FitnessLanding,
            Landing::Mindfulness => ContentKind::MindfulnessLanding,
            Landing::Nutrition => ContentKind::NutritionLanding,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Landing::Fitness => {
                "generate 10 workout plans that are versatile and great for different peoples."
            }
            Landing::Mindfulness => {
                "generate 7 mindfulness exercises that are versatile and great for different peoples."
            }
            Landing::Nutrition => {
                "generate 10 different meals and exhaustively description of how to prepare them \
                 that are versatile and great for different peoples."
            }
        }
    }
}

/// `YYYYMMDD` for `now` in the given offset.
pub fn day_key(now: OffsetDateTime, offset: UtcOffset) -> String {
    let fmt = format_description!("[year][month][day]");
    now.to_offset(offset)
        .date()
        .format(&fmt)
        .unwrap_or_else(|_| now.date().to_string())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-content", post(generate_content))
        .route("/fitness-landing", get(fitness_landing))
        .route("/mindfulness-landing", get(mindfulness_landing))
        .route("/nutrition-landing", get(nutrition_landing))
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentRequest {
    pub prompt: String,
    pub schema: String,
}

pub async fn generate(st: &AppState, req: GenerateContentRequest) -> Result<Value, AppError> {
    let kind = ContentKind::from_schema_name(&req.schema)
        .ok_or_else(|| AppError::validation("schema", "Invalid schema"))?;
    if req.prompt.trim().is_empty() {
        return Err(AppError::validation("prompt", "must not be blank"));
    }
    Ok(st.generator.generate(GenerationRequest::text(kind, req.prompt)).await?)
}

/// Generates today's landing and overwrites any earlier one for the same day.
pub async fn refresh_landing(st: &AppState, landing: Landing) -> Result<Value, AppError> {
    let content = st
        .generator
        .generate(GenerationRequest::text(landing.kind(), landing.prompt()))
        .await?;
    let day = day_key(OffsetDateTime::now_utc(), st.config.utc_offset);
    st.landings.upsert(landing, &day, &content).await?;
    info!(landing = landing.as_str(), %day, "landing refreshed");
    Ok(content)
}

#[instrument(skip(state, payload), fields(schema = %payload.schema))]
pub async fn generate_content(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Json(payload): Json<GenerateContentRequest>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(generate(&state, payload).await?))
}

#[instrument(skip(state))]
pub async fn fitness_landing(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(refresh_landing(&state, Landing::Fitness).await?))
}

#[instrument(skip(state))]
pub async fn mindfulness_landing(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(refresh_landing(&state, Landing::Mindfulness).await?))
}

#[instrument(skip(state))]
pub async fn nutrition_landing(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(refresh_landing(&state, Landing::Nutrition).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use axum::http::StatusCode;
    use serde_json::json;
    use time::macros::{datetime, offset};

    #[test]
    fn day_key_uses_local_date() {
        let late = datetime!(2025-03-09 22:30 UTC);
        assert_eq!(day_key(late, offset!(+3)), "20250310");
        assert_eq!(day_key(late, UtcOffset::UTC), "20250309");
    }

    #[tokio::test]
    async fn unknown_schema_is_rejected_before_generation() {
        let h = testing::harness();
        let err = generate(
            &h.state,
            GenerateContentRequest {
                prompt: "anything".into(),
                schema: "horoscope".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(ContentKind::ALL.iter().all(|k| h.generator.calls(*k) == 0));
    }

    #[tokio::test]
    async fn known_schema_returns_generator_output() {
        let h = testing::harness();
        h.generator
            .respond(ContentKind::Mood, json!({ "recommendations": ["walk outside"] }));
        let out = generate(
            &h.state,
            GenerateContentRequest {
                prompt: "I feel low".into(),
                schema: "mood".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(out["recommendations"][0], "walk outside");
    }

    #[tokio::test]
    async fn landing_is_stored_under_today() {
        let h = testing::harness();
        let body = json!({ "activities": [] });
        h.generator.respond(ContentKind::MindfulnessLanding, body.clone());
        refresh_landing(&h.state, Landing::Mindfulness).await.unwrap();

        let day = day_key(OffsetDateTime::now_utc(), h.state.config.utc_offset);
        let stored = h.store.landing(Landing::Mindfulness, &day);
        assert_eq!(stored, Some(body));
        assert!(h.store.landing(Landing::Fitness, &day).is_none());
    }

    #[tokio::test]
    async fn landing_generation_failure_stores_nothing() {
        let h = testing::harness();
        h.generator.fail(ContentKind::FitnessLanding);
        let err = refresh_landing(&h.state, Landing::Fitness).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        let day = day_key(OffsetDateTime::now_utc(), h.state.config.utc_offset);
        assert!(h.store.landing(Landing::Fitness, &day).is_none());
    }
}
