pub mod repo;
pub mod services;
pub mod types;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use crate::{auth::AuthUser, error::AppError, state::AppState};

pub use repo::PlanRepo;
pub use types::{PlanStage, StoredPlan};

pub fn router() -> Router<AppState> {
    Router::new().route("/plan", get(get_plan))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<(StatusCode, Json<StoredPlan>), AppError> {
    let (plan, created) = services::get_or_create_plan(&state, user_id).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(plan)))
}
