pub mod dto;
pub mod handlers;
pub mod questions;
pub mod repo;
pub mod services;
pub mod units;
pub mod validate;

use crate::state::AppState;
use axum::Router;

pub use repo::OnboardingRepo;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
