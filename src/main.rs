mod app;
mod auth;
mod bookings;
mod config;
mod content;
mod db;
mod error;
mod genai;
mod inference;
mod meal_plans;
mod onboarding;
mod plan;
mod points;
mod profile;
mod state;
mod tracking;

#[cfg(test)]
mod testing;

use crate::{onboarding::questions, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "iki=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    state.onboarding.seed_questions(&questions::seed()).await?;
    tracing::info!("onboarding questions seeded");

    app::serve(app::build_app(state)).await
}
