pub mod repo;
pub mod services;
pub mod types;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{auth::AuthUser, error::AppError, state::AppState};

pub use repo::MealPlanRepo;
pub use types::DailyMealPlan;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meal-plan", get(get_meal_plan))
        .route("/meal-plans", get(list_meal_plans))
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[instrument(skip(state))]
pub async fn get_meal_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DateQuery>,
) -> Result<(StatusCode, Json<DailyMealPlan>), AppError> {
    let date = services::parse_date(q.date.as_deref())?;
    let (plan, created) = services::get_or_create_meal_plan(&state, user_id, date).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(plan)))
}

#[instrument(skip(state))]
pub async fn list_meal_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<DailyMealPlan>>, AppError> {
    Ok(Json(state.meal_plans.list(user_id).await?))
}
