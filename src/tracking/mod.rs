pub mod repo;
pub mod services;
pub mod types;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser, error::AppError, meal_plans::services::parse_date, state::AppState,
};
use types::{DailyConsumption, NewMeal, TrackedMeal};

pub use repo::TrackingRepo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meal-tracking", get(list_meals).post(create_meal))
        .route("/meal-tracking/all", get(list_meals))
        .route("/meal-tracking/:id", get(get_meal).delete(delete_meal))
        .route("/daily-consumption", get(list_consumption))
        .route("/daily-consumption/:date", get(get_consumption))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<NewMeal>,
) -> Result<(StatusCode, Json<TrackedMeal>), AppError> {
    let meal = services::track_meal(&state, user_id, payload).await?;
    info!(user_id = %user_id, meal_id = %meal.id, date = %meal.date, "meal tracked");
    Ok((StatusCode::CREATED, Json(meal)))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<TrackedMeal>>, AppError> {
    Ok(Json(state.tracking.list_meals(user_id).await?))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TrackedMeal>, AppError> {
    state
        .tracking
        .get_meal(user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(services::MEAL_NOT_FOUND.into()))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let meal = services::untrack_meal(&state, user_id, id).await?;
    info!(user_id = %user_id, meal_id = %id, date = %meal.date, "meal untracked");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_consumption(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<DailyConsumption>>, AppError> {
    Ok(Json(state.tracking.list_consumption(user_id).await?))
}

#[instrument(skip(state))]
pub async fn get_consumption(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DailyConsumption>, AppError> {
    let date = parse_date(Some(&date))?;
    state
        .tracking
        .get_consumption(user_id, date)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Daily consumption not found for this date".into()))
}
