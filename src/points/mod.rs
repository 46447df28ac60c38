pub mod notify;
pub mod payments;
pub mod repo;
pub mod services;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::instrument;

use crate::{auth::AuthUser, error::AppError, state::AppState};
use services::{BalanceCheck, Recharge, Reconciled, Wallet};

pub use notify::{FcmNotifier, Notifier};
pub use payments::{FlutterwaveGateway, PaymentGateway};
pub use repo::AccountRepo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check-points-balance", post(check_points_balance))
        .route("/check-regular-points-balance", post(check_regular_points_balance))
        .route("/recharge-points", post(recharge_points))
        .route("/reconcile-points-balance", post(reconcile_points_balance))
}

#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    #[serde(rename = "costPoints")]
    pub cost_points: i64,
}

#[derive(Debug, Deserialize)]
pub struct RechargeRequest {
    pub points: i64,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub transaction_ref: String,
    pub added_points: i64,
}

#[instrument(skip(state))]
pub async fn check_points_balance(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<BalanceRequest>,
) -> Result<Json<BalanceCheck>, AppError> {
    Ok(Json(
        services::check_balance(&state, user_id, req.cost_points, Wallet::Points).await?,
    ))
}

#[instrument(skip(state))]
pub async fn check_regular_points_balance(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<BalanceRequest>,
) -> Result<Json<BalanceCheck>, AppError> {
    Ok(Json(
        services::check_balance(&state, user_id, req.cost_points, Wallet::Regular).await?,
    ))
}

#[instrument(skip(state, req))]
pub async fn recharge_points(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<RechargeRequest>,
) -> Result<Json<Recharge>, AppError> {
    Ok(Json(
        services::recharge(&state, user_id, req.points, &req.phone).await?,
    ))
}

#[instrument(skip(state))]
pub async fn reconcile_points_balance(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<ReconcileRequest>,
) -> Result<Json<Reconciled>, AppError> {
    Ok(Json(
        services::reconcile(&state, user_id, &req.transaction_ref, req.added_points).await?,
    ))
}
