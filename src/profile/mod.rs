pub mod repo;
pub mod services;
pub mod types;

use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{auth::AuthUser, error::AppError, state::AppState};

pub use repo::ProfileRepo;
pub use types::Profile;

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, AppError> {
    state
        .profiles
        .get(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User profile not found".into()))
}
